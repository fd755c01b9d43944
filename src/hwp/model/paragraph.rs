//! Typed paragraph records of a section stream.
//!
//! A paragraph is a `PARA_HEADER` record whose children carry its text
//! (`PARA_TEXT`), formatting runs and layout. The header's counts fix the
//! widths of the side tables; a table whose payload disagrees is a
//! [`Error::RecordSizeMismatch`].

use super::expect_size;
use crate::common::binary::{read_i32_le, read_u8, read_u16_le, read_u32_le};
use crate::common::bitfield::{BitRange, BitfieldView};
use crate::common::error::{Error, Result};
use crate::hwp::consts::{
    TAG_CTRL_HEADER, TAG_PARA_CHAR_SHAPE, TAG_PARA_HEADER, TAG_PARA_LINE_SEG, TAG_PARA_RANGE_TAG,
};
use crate::hwp::text::control::ctrl_id_string;
use bitflags::bitflags;
use bytes::Bytes;

pub const CHAR_COUNT: BitRange = BitRange::value(0, 31, "char_count");
pub const LAST_IN_LIST: BitRange = BitRange::flag(31, "last_in_list");

pub const SECTION_BREAK: BitRange = BitRange::flag(0, "section");
pub const COLUMN_DEF_BREAK: BitRange = BitRange::flag(1, "column_definition");
pub const PAGE_BREAK: BitRange = BitRange::flag(2, "page");
pub const COLUMN_BREAK: BitRange = BitRange::flag(3, "column");

pub const BREAK_FLAGS: [BitRange; 4] = [SECTION_BREAK, COLUMN_DEF_BREAK, PAGE_BREAK, COLUMN_BREAK];

bitflags! {
    /// Control codes present in a paragraph: bit `n` is set when code `n`
    /// occurs in its `PARA_TEXT`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControlMask: u32 {
        const SECTION_COLUMN_DEF = 1 << 2;
        const FIELD_START = 1 << 3;
        const FIELD_END = 1 << 4;
        const TITLE_MARK = 1 << 8;
        const TAB = 1 << 9;
        const LINE_BREAK = 1 << 10;
        const DRAWING_TABLE = 1 << 11;
        const PARA_BREAK = 1 << 13;
        const HIDDEN_COMMENT = 1 << 15;
        const HEADER_FOOTER = 1 << 16;
        const FOOTNOTE_ENDNOTE = 1 << 17;
        const AUTO_NUMBER = 1 << 18;
        const PAGE_CONTROL = 1 << 21;
        const BOOKMARK = 1 << 22;
        const DUTMAL = 1 << 23;
        const HYPHEN = 1 << 24;
        const BOUND_SPACE = 1 << 30;
        const FIXED_WIDTH_SPACE = 1 << 31;
    }
}

impl ControlMask {
    /// Whether control `code` is announced by the mask.
    pub fn has_code(&self, code: u16) -> bool {
        code < 32 && self.bits() & (1 << code) != 0
    }
}

/// `PARA_HEADER` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParaHeader {
    /// Packed char count and last-in-list flag
    pub text_word: u32,
    pub control_mask: ControlMask,
    pub para_shape_id: u16,
    pub style_id: u8,
    /// Section/column/page break bits, see [`BREAK_FLAGS`]
    pub break_flags: u8,
    pub char_shape_count: u16,
    pub range_tag_count: u16,
    pub line_seg_count: u16,
    pub instance_id: u32,
    /// Change-tracking merge flag, present from 5.0.3.2
    pub track_merge: Option<u16>,
}

impl ParaHeader {
    pub const SIZE: usize = 22;
    pub const SIZE_WITH_MERGE: usize = 24;

    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::SIZE && payload.len() != Self::SIZE_WITH_MERGE {
            return Err(Error::RecordSizeMismatch {
                tag_id: TAG_PARA_HEADER,
                expected: Self::SIZE,
                actual: payload.len(),
            });
        }
        Ok(Self {
            text_word: read_u32_le(payload, 0)?,
            control_mask: ControlMask::from_bits_retain(read_u32_le(payload, 4)?),
            para_shape_id: read_u16_le(payload, 8)?,
            style_id: read_u8(payload, 10)?,
            break_flags: read_u8(payload, 11)?,
            char_shape_count: read_u16_le(payload, 12)?,
            range_tag_count: read_u16_le(payload, 14)?,
            line_seg_count: read_u16_le(payload, 16)?,
            instance_id: read_u32_le(payload, 18)?,
            track_merge: if payload.len() == Self::SIZE_WITH_MERGE {
                Some(read_u16_le(payload, 22)?)
            } else {
                None
            },
        })
    }

    /// Character slots the paragraph's text occupies.
    pub fn char_count(&self) -> usize {
        BitfieldView::new(self.text_word).get(CHAR_COUNT) as usize
    }

    /// Whether this is the last paragraph of its list.
    pub fn is_last_in_list(&self) -> bool {
        BitfieldView::new(self.text_word).flag(LAST_IN_LIST)
    }

    pub fn has_break(&self, flag: BitRange) -> bool {
        BitfieldView::new(self.break_flags).flag(flag)
    }

    /// Names of the break bits that are set.
    pub fn break_names(&self) -> Vec<&'static str> {
        BitfieldView::new(self.break_flags).set_flags(&BREAK_FLAGS)
    }
}

fn table_size(tag_id: u16, payload: &[u8], entry: usize, count: Option<u16>) -> Result<usize> {
    match count {
        Some(count) => {
            expect_size(tag_id, payload, entry * count as usize)?;
            Ok(count as usize)
        },
        None if payload.len() % entry == 0 => Ok(payload.len() / entry),
        None => Err(Error::RecordSizeMismatch {
            tag_id,
            expected: payload.len() - payload.len() % entry,
            actual: payload.len(),
        }),
    }
}

/// Character shape in force from `position` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharShapeRun {
    pub position: u32,
    pub shape_id: u32,
}

impl CharShapeRun {
    pub const SIZE: usize = 8;

    /// Parse a `PARA_CHAR_SHAPE` table; `count` comes from the header.
    pub fn parse_table(payload: &[u8], count: Option<u16>) -> Result<Vec<Self>> {
        let count = table_size(TAG_PARA_CHAR_SHAPE, payload, Self::SIZE, count)?;
        (0..count)
            .map(|i| {
                let base = i * Self::SIZE;
                Ok(Self {
                    position: read_u32_le(payload, base)?,
                    shape_id: read_u32_le(payload, base + 4)?,
                })
            })
            .collect()
    }
}

pub const FIRST_ON_PAGE: BitRange = BitRange::flag(0, "first_on_page");
pub const FIRST_ON_COLUMN: BitRange = BitRange::flag(1, "first_on_column");
pub const EMPTY_SEGMENT: BitRange = BitRange::flag(16, "empty_segment");
pub const FIRST_OF_LINE: BitRange = BitRange::flag(17, "first_of_line");
pub const LAST_OF_LINE: BitRange = BitRange::flag(18, "last_of_line");
pub const AUTO_HYPHENATED: BitRange = BitRange::flag(19, "auto_hyphenated");
pub const INDENTED: BitRange = BitRange::flag(20, "indented");
pub const HEAD_SHAPE: BitRange = BitRange::flag(21, "para_head_shape");

pub const LINE_SEG_FLAGS: [BitRange; 8] = [
    FIRST_ON_PAGE,
    FIRST_ON_COLUMN,
    EMPTY_SEGMENT,
    FIRST_OF_LINE,
    LAST_OF_LINE,
    AUTO_HYPHENATED,
    INDENTED,
    HEAD_SHAPE,
];

/// Layout of one line segment, in HWPUNIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSeg {
    pub text_start: u32,
    pub vertical_pos: i32,
    pub line_height: i32,
    pub text_height: i32,
    pub baseline_gap: i32,
    pub line_spacing: i32,
    pub column_start: i32,
    pub segment_width: i32,
    pub tag: u32,
}

impl LineSeg {
    pub const SIZE: usize = 36;

    /// Parse a `PARA_LINE_SEG` table; `count` comes from the header.
    pub fn parse_table(payload: &[u8], count: Option<u16>) -> Result<Vec<Self>> {
        let count = table_size(TAG_PARA_LINE_SEG, payload, Self::SIZE, count)?;
        (0..count)
            .map(|i| {
                let base = i * Self::SIZE;
                Ok(Self {
                    text_start: read_u32_le(payload, base)?,
                    vertical_pos: read_i32_le(payload, base + 4)?,
                    line_height: read_i32_le(payload, base + 8)?,
                    text_height: read_i32_le(payload, base + 12)?,
                    baseline_gap: read_i32_le(payload, base + 16)?,
                    line_spacing: read_i32_le(payload, base + 20)?,
                    column_start: read_i32_le(payload, base + 24)?,
                    segment_width: read_i32_le(payload, base + 28)?,
                    tag: read_u32_le(payload, base + 32)?,
                })
            })
            .collect()
    }

    pub fn has_flag(&self, flag: BitRange) -> bool {
        BitfieldView::new(self.tag).flag(flag)
    }

    pub fn flag_names(&self) -> Vec<&'static str> {
        BitfieldView::new(self.tag).set_flags(&LINE_SEG_FLAGS)
    }
}

pub const RANGE_KIND: BitRange = BitRange::value(24, 8, "kind");
pub const RANGE_DATA: BitRange = BitRange::value(0, 24, "data");

/// Marked character range such as a highlight or change-tracking span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeTag {
    pub start: u32,
    pub end: u32,
    pub tag: u32,
}

impl RangeTag {
    pub const SIZE: usize = 12;

    /// Parse a `PARA_RANGE_TAG` table; `count` comes from the header.
    pub fn parse_table(payload: &[u8], count: Option<u16>) -> Result<Vec<Self>> {
        let count = table_size(TAG_PARA_RANGE_TAG, payload, Self::SIZE, count)?;
        (0..count)
            .map(|i| {
                let base = i * Self::SIZE;
                Ok(Self {
                    start: read_u32_le(payload, base)?,
                    end: read_u32_le(payload, base + 4)?,
                    tag: read_u32_le(payload, base + 8)?,
                })
            })
            .collect()
    }

    pub fn kind(&self) -> u8 {
        BitfieldView::new(self.tag).get(RANGE_KIND) as u8
    }

    pub fn data(&self) -> u32 {
        BitfieldView::new(self.tag).get(RANGE_DATA) as u32
    }
}

/// `CTRL_HEADER` record: a control id and its undecoded properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtrlHeader {
    pub ctrl_id: u32,
    pub data: Bytes,
}

impl CtrlHeader {
    pub fn parse(payload: &Bytes) -> Result<Self> {
        if payload.len() < 4 {
            return Err(Error::RecordSizeMismatch {
                tag_id: TAG_CTRL_HEADER,
                expected: 4,
                actual: payload.len(),
            });
        }
        Ok(Self {
            ctrl_id: read_u32_le(payload, 0)?,
            data: payload.slice(4..),
        })
    }

    /// Four-character control id, e.g. `"secd"`.
    pub fn id_string(&self) -> String {
        ctrl_id_string(self.ctrl_id)
    }
}
