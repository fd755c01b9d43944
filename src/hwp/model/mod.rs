//! Typed document model.
//!
//! Records of the tree are decoded by tag into [`NodeKind`]s; anything the
//! model does not cover stays an opaque node carrying its raw record.

pub mod assembler;
pub mod docinfo;
pub mod node;
pub mod paragraph;

pub use assembler::{DocumentModelAssembler, SubtreeFailure};
pub use node::{Node, NodeKind, Paragraph, Walk};

use crate::common::error::{Error, Result};

/// Fail unless `payload` is exactly `expected` bytes long.
pub(crate) fn expect_size(tag_id: u16, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() != expected {
        return Err(Error::RecordSizeMismatch {
            tag_id,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}
