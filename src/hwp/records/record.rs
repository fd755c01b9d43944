//! Record header packing and the decoded record type.
//!
//! # Format
//!
//! Every record starts with one little-endian 32-bit header word:
//! - Bits 0-9: tag id
//! - Bits 10-19: level (nesting depth)
//! - Bits 20-31: payload size
//!
//! A size field of `0xFFF` is an escape: the real size follows in a second
//! 32-bit word, which is not part of the payload.

use crate::common::bitfield::{BitRange, BitfieldView};
use crate::hwp::consts::HwpTag;
use bytes::Bytes;

pub const TAG_ID: BitRange = BitRange::value(0, 10, "tag_id");
pub const LEVEL: BitRange = BitRange::value(10, 10, "level");
pub const SIZE: BitRange = BitRange::value(20, 12, "size");

/// Header fields, in wire order.
pub const HEADER_FIELDS: [BitRange; 3] = [TAG_ID, LEVEL, SIZE];

/// Size field value that announces an extended size word.
pub const EXTENDED_SIZE: u32 = 0xFFF;

/// Largest encodable tag id or level.
pub const MAX_TAG_ID: u16 = 0x3FF;
pub const MAX_LEVEL: u16 = 0x3FF;

/// Tag, level and size unpacked from a header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag_id: u16,
    pub level: u16,
    /// Size field as stored: `0xFFF` when the extended word follows
    pub size_field: u32,
}

impl RecordHeader {
    /// Unpack a header word.
    pub fn unpack(word: u32) -> Self {
        let view = BitfieldView::new(word);
        Self {
            tag_id: view.get(TAG_ID) as u16,
            level: view.get(LEVEL) as u16,
            size_field: view.get(SIZE) as u32,
        }
    }

    /// Pack into a header word; out-of-range fields are masked.
    pub fn pack(&self) -> u32 {
        (u32::from(self.tag_id) & 0x3FF)
            | ((u32::from(self.level) & 0x3FF) << 10)
            | ((self.size_field & 0xFFF) << 20)
    }

    /// Whether an extended size word follows this header.
    #[inline]
    pub fn has_extended_size(&self) -> bool {
        self.size_field == EXTENDED_SIZE
    }
}

/// One record of a DocInfo or section stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Raw 10-bit tag id
    pub tag_id: u16,
    /// Nesting level
    pub level: u16,
    /// Payload size in bytes
    pub size: u32,
    /// Byte offset of the header word in its stream
    pub offset: usize,
    /// Whether the size was stored in an extended word
    pub extended: bool,
    /// Payload bytes, a slice of the stream buffer
    pub payload: Bytes,
}

impl Record {
    /// Build a record for encoding; offset is unknown until written.
    pub fn new(tag_id: u16, level: u16, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            tag_id,
            level,
            size: payload.len() as u32,
            offset: 0,
            extended: payload.len() >= EXTENDED_SIZE as usize,
            payload,
        }
    }

    /// Typed view of the tag id.
    #[inline]
    pub fn tag(&self) -> HwpTag {
        HwpTag::from(self.tag_id)
    }

    /// Bytes this record occupies on the wire, header included.
    pub fn encoded_len(&self) -> usize {
        let header = if self.needs_extended_size() { 8 } else { 4 };
        header + self.payload.len()
    }

    /// Whether encoding must use the extended size word.
    ///
    /// Sizes from `0xFFF` up cannot be stored inline; a record read with the
    /// escape keeps it so re-encoding reproduces the input bytes.
    #[inline]
    pub fn needs_extended_size(&self) -> bool {
        self.extended || self.payload.len() >= EXTENDED_SIZE as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::bitfield::table_is_disjoint;

    #[test]
    fn test_unpack_header_word() {
        // tag 0x42, level 1, size 22
        let word = 0x042 | (1 << 10) | (22 << 20);
        let header = RecordHeader::unpack(word);
        assert_eq!(header.tag_id, 0x42);
        assert_eq!(header.level, 1);
        assert_eq!(header.size_field, 22);
        assert!(!header.has_extended_size());
        assert_eq!(header.pack(), word);
    }

    #[test]
    fn test_escape_value() {
        let header = RecordHeader::unpack(0xFFF0_0010);
        assert_eq!(header.tag_id, 0x10);
        assert_eq!(header.level, 0);
        assert!(header.has_extended_size());
    }

    #[test]
    fn test_header_fields_cover_word() {
        assert!(table_is_disjoint(&HEADER_FIELDS));
        let total: u32 = HEADER_FIELDS.iter().map(|r| u32::from(r.width)).sum();
        assert_eq!(total, 32);
    }

    #[test]
    fn test_new_record_picks_extended_size() {
        assert!(!Record::new(0x10, 0, vec![0u8; 4094]).needs_extended_size());
        assert!(Record::new(0x10, 0, vec![0u8; 4095]).needs_extended_size());
        assert_eq!(Record::new(0x10, 0, vec![0u8; 4095]).encoded_len(), 8 + 4095);
        assert_eq!(Record::new(0x43, 2, Vec::<u8>::new()).encoded_len(), 4);
    }
}
