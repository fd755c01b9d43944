//! Unified error type for the decoder.
//!
//! Submodules mirror the split between the error enum and the conversions
//! from lower-level reader errors.

pub mod conversions;
pub mod types;

pub use types::{Error, Result};
