//! Conversions from lower-level errors into [`Error`].

use super::types::Error;
use crate::common::binary::BinaryError;

impl From<BinaryError> for Error {
    /// A short read inside a record payload that has no better context.
    ///
    /// Typed record decoders usually check widths up front and report
    /// [`Error::RecordSizeMismatch`] themselves; this is the fallback for
    /// variable-length fields discovered mid-payload.
    fn from(err: BinaryError) -> Self {
        match err {
            BinaryError::InsufficientData {
                expected,
                available,
            } => Error::RecordSizeMismatch {
                tag_id: 0,
                expected,
                actual: available,
            },
        }
    }
}

impl Error {
    /// Fill in the tag of a size mismatch converted from a [`BinaryError`].
    pub fn for_tag(self, tag: u16) -> Self {
        match self {
            Error::RecordSizeMismatch {
                tag_id: 0,
                expected,
                actual,
            } => Error::RecordSizeMismatch {
                tag_id: tag,
                expected,
                actual,
            },
            other => other,
        }
    }
}
