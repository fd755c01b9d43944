//! Error type shared by every stage of the decoder.
//!
//! Structural errors (signature, truncation, level skips) abort the stream
//! they occur in. Per-record and per-paragraph errors are either collected
//! alongside the model or returned, depending on strict mode.
use thiserror::Error;

/// Main error type for HWP decoding.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The FileHeader stream does not start with the HWP signature
    #[error("Not an HWP 5.0 document: signature mismatch")]
    SignatureMismatch,

    /// Stream ended inside a fixed-size header
    #[error("Truncated header at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedHeader {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Stream ended inside a record payload
    #[error(
        "Truncated record (tag {tag_id}) at offset {offset}: declared {declared} bytes, {available} available"
    )]
    TruncatedRecord {
        offset: usize,
        tag_id: u16,
        declared: usize,
        available: usize,
    },

    /// A record's level skips past the open ancestor chain
    #[error("Level skip at offset {offset} (tag {tag_id}): level {level} with only {depth} open ancestors")]
    LevelSkip {
        offset: usize,
        tag_id: u16,
        level: u16,
        depth: usize,
    },

    /// A record payload does not match the width its fields declare
    #[error("Record size mismatch for tag {tag_id}: expected {expected} bytes, got {actual}")]
    RecordSizeMismatch {
        tag_id: u16,
        expected: usize,
        actual: usize,
    },

    /// A control code's reserved slots run past the character stream
    #[error(
        "Unterminated control 0x{code:04X} at slot {position}: reserves {reserved} slots, {available} remain"
    )]
    UnterminatedControl {
        position: usize,
        code: u16,
        reserved: usize,
        available: usize,
    },

    /// A code unit in the control range that the catalog does not document
    #[error("Unknown control code 0x{code:04X} at slot {position}")]
    UnknownControl { position: usize, code: u16 },

    /// Consumed character slots differ from the paragraph's declared count
    #[error("Character count mismatch: declared {declared}, consumed {consumed}")]
    CharCountMismatch { declared: usize, consumed: usize },

    /// A required stream is missing from the container
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// An error raised while decoding a named stream
    #[error("In stream {stream}: {source}")]
    Stream {
        stream: String,
        #[source]
        source: Box<Error>,
    },

    /// Inflating a compressed stream failed
    #[error("Decompression failed: {0}")]
    Decompress(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

impl Error {
    /// Attach the name of the stream being decoded.
    ///
    /// Errors already carrying a stream name are returned unchanged.
    pub fn in_stream(self, stream: impl Into<String>) -> Self {
        match self {
            Error::Stream { .. } => self,
            other => Error::Stream {
                stream: stream.into(),
                source: Box::new(other),
            },
        }
    }

    /// The error with any stream wrapper removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Stream { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error invalidates the whole stream it came from.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.root(),
            Error::SignatureMismatch
                | Error::TruncatedHeader { .. }
                | Error::TruncatedRecord { .. }
                | Error::LevelSkip { .. }
                | Error::Io(_)
                | Error::Decompress(_)
        )
    }
}

/// Result type for HWP operations.
pub type Result<T> = std::result::Result<T, Error>;
