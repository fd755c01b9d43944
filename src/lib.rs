//! hwp5 - A Rust library for decoding HWP 5.0 documents
//!
//! HWP is the native format of the Hangul word processor. Its DocInfo and
//! section streams are flat sequences of tagged records whose nesting is
//! implied by a level field. This crate turns those streams into a typed
//! document model and can write the records back unchanged.
//!
//! # Features
//!
//! - **Record tokenizer**: zero-copy record splitting with extended sizes
//! - **Tree builder**: level-based reconstruction of the record tree
//! - **Paragraph text**: UTF-16 text with inline controls sized by a catalog
//! - **Typed records**: file header, DocInfo tables and paragraph records
//! - **Re-encoding**: byte-identical output for unmodified input
//! - **Lenient mode**: broken records and sections are collected, not fatal
//!
//! # Example
//!
//! ```
//! use hwp5::hwp::{DecodeOptions, MemoryStreams, decode_document};
//!
//! # fn main() -> hwp5::Result<()> {
//! # let mut header = vec![0u8; 256];
//! # header[..17].copy_from_slice(b"HWP Document File");
//! # header[32..36].copy_from_slice(&0x0500_0302u32.to_le_bytes());
//! // Streams as read from the compound file, already inflated
//! let streams = MemoryStreams::new()
//!     .with_stream("FileHeader", header)
//!     .with_stream("DocInfo", Vec::new());
//!
//! let decoded = decode_document(&streams, &DecodeOptions::new())?;
//! assert_eq!(decoded.model.header.version.to_string(), "5.0.3.2");
//! assert!(decoded.model.sections.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! Every fallible operation returns [`Result`]. Structural problems
//! (signature, truncation, level skips) fail the stream they occur in;
//! record-level problems are collected in [`hwp::Decoded::failures`] unless
//! strict mode is enabled.

pub mod common;
pub mod hwp;

pub use common::{Error, Result};
pub use hwp::{DecodeOptions, Decoded, DocumentModel, decode_document};
