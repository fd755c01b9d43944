//! HWP 5.0 document decoding.
//!
//! An HWP 5.0 file is an OLE compound file. This module works on its streams
//! once they have been read out of the container:
//!
//! - [`header`]: the fixed 256-byte `FileHeader`
//! - [`container`]: the stream collection and the inflate/decrypt bridge
//! - [`records`]: record tokenizing, level-based tree building, encoding
//! - [`text`]: the paragraph character stream and its inline controls
//! - [`model`]: typed decoding of records into model nodes
//! - [`document`]: the whole-document entry points

pub mod consts;
pub mod container;
pub mod document;
pub mod header;
pub mod model;
pub mod records;
pub mod text;

pub use container::{DecodedStreams, MemoryStreams, StreamCodec, StreamSource};
#[cfg(feature = "flate")]
pub use container::FlateCodec;
pub use document::{
    DecodeOptions, Decoded, DocInfo, DocumentModel, Section, decode_container, decode_document,
};
pub use header::{FileHeader, FileVersion};
pub use model::{Node, NodeKind, Paragraph, SubtreeFailure};
pub use records::{Record, RecordReader, RecordTree, RecordWriter};
pub use text::{CharToken, ControlCatalog, ParagraphCharDecoder};
