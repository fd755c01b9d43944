//! Utilities shared by every stage of the decoder.

pub mod binary;
pub mod bitfield;
pub mod error;

pub use bitfield::{BitRange, BitSemantic, BitfieldView};
pub use error::{Error, Result};
