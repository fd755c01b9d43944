/// HWP record tokenizing, tree building and encoding.
///
/// This module turns a decoded DocInfo or section stream into records and
/// the records into a level-based tree.

pub mod reader;
pub mod record;
pub mod tree;
pub mod writer;

pub use reader::RecordReader;
pub use record::{Record, RecordHeader};
pub use tree::{NodeId, RecordNode, RecordTree};
pub use writer::{RecordWriter, encode_records};
