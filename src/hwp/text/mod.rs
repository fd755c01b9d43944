/// Paragraph character streams: control catalog and decoder.

pub mod control;
pub mod decoder;

pub use control::{ControlCatalog, ControlKind, ControlSpec};
pub use decoder::{CharToken, Control, ParagraphCharDecoder, decode_utf16, tokens_to_string};
