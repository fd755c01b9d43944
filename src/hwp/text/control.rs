//! Inline control codes of the paragraph character stream.
//!
//! Code units `0x0000..=0x001F` never appear as text. Each one starts a
//! control occupying a fixed number of slots:
//!
//! - *char* controls occupy only their own slot (line break, hyphen, ...)
//! - *inline* and *extended* controls occupy 8 slots: the code, 6 units of
//!   parameters and the code repeated. Extended controls additionally own a
//!   `CTRL_HEADER` record with the same control id.

use phf::phf_map;

/// Slots beyond the code itself reserved by inline and extended controls.
pub const OBJECT_RESERVED_SLOTS: usize = 7;

pub const EXTENDED_RESERVED: u16 = 1;
pub const SECTION_COLUMN_DEF: u16 = 2;
pub const FIELD_START: u16 = 3;
pub const FIELD_END: u16 = 4;
pub const TITLE_MARK: u16 = 8;
pub const TAB: u16 = 9;
pub const LINE_BREAK: u16 = 10;
pub const DRAWING_TABLE: u16 = 11;
pub const PARA_BREAK: u16 = 13;
pub const HIDDEN_COMMENT: u16 = 15;
pub const HEADER_FOOTER: u16 = 16;
pub const FOOTNOTE_ENDNOTE: u16 = 17;
pub const AUTO_NUMBER: u16 = 18;
pub const PAGE_CONTROL: u16 = 21;
pub const BOOKMARK: u16 = 22;
pub const DUTMAL: u16 = 23;
pub const HYPHEN: u16 = 24;
pub const BOUND_SPACE: u16 = 30;
pub const FIXED_WIDTH_SPACE: u16 = 31;

/// How a control occupies the character stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// One slot, no parameters
    Char,
    /// Parameters inline, no separate record
    Inline,
    /// Parameters inline plus a `CTRL_HEADER` record
    Extended,
}

/// Catalog entry for one control code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSpec {
    pub kind: ControlKind,
    /// Slots after the code consumed as inline data
    pub reserved: usize,
    pub name: &'static str,
}

/// Control code table for `0x0000..=0x001F`.
///
/// Codes without an entry are rejected by the decoder rather than given a
/// guessed reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCatalog {
    entries: [Option<ControlSpec>; 32],
}

impl Default for ControlCatalog {
    fn default() -> Self {
        Self::hwp5()
    }
}

impl ControlCatalog {
    /// Catalog with no controls at all.
    pub fn empty() -> Self {
        Self { entries: [None; 32] }
    }

    /// The control table of the HWP 5.0 format.
    pub fn hwp5() -> Self {
        use ControlKind::{Char, Extended, Inline};

        let table: [(ControlKind, &'static str); 32] = [
            (Char, "unusable"),
            (Extended, "reserved"),
            (Extended, "section_column_def"),
            (Extended, "field_start"),
            (Inline, "field_end"),
            (Inline, "reserved"),
            (Inline, "reserved"),
            (Inline, "reserved"),
            (Inline, "title_mark"),
            (Inline, "tab"),
            (Char, "line_break"),
            (Extended, "drawing_table"),
            (Extended, "reserved"),
            (Char, "para_break"),
            (Extended, "reserved"),
            (Extended, "hidden_comment"),
            (Extended, "header_footer"),
            (Extended, "footnote_endnote"),
            (Extended, "auto_number"),
            (Inline, "reserved"),
            (Inline, "reserved"),
            (Extended, "page_control"),
            (Extended, "bookmark"),
            (Extended, "dutmal"),
            (Char, "hyphen"),
            (Char, "reserved"),
            (Char, "reserved"),
            (Char, "reserved"),
            (Char, "reserved"),
            (Char, "reserved"),
            (Char, "bound_space"),
            (Char, "fixed_width_space"),
        ];

        let mut catalog = Self::empty();
        for (code, (kind, name)) in table.into_iter().enumerate() {
            let reserved = match kind {
                Char => 0,
                Inline | Extended => OBJECT_RESERVED_SLOTS,
            };
            catalog.entries[code] = Some(ControlSpec {
                kind,
                reserved,
                name,
            });
        }
        catalog
    }

    /// Add or replace the entry for `code`. Codes outside the control range
    /// are ignored.
    pub fn with(mut self, code: u16, kind: ControlKind, reserved: usize, name: &'static str) -> Self {
        if let Some(slot) = self.entries.get_mut(code as usize) {
            *slot = Some(ControlSpec {
                kind,
                reserved,
                name,
            });
        }
        self
    }

    /// Remove the entry for `code`.
    pub fn without(mut self, code: u16) -> Self {
        if let Some(slot) = self.entries.get_mut(code as usize) {
            *slot = None;
        }
        self
    }

    /// Entry for `code`, if documented.
    #[inline]
    pub fn get(&self, code: u16) -> Option<&ControlSpec> {
        self.entries.get(code as usize).and_then(|e| e.as_ref())
    }
}

/// Whether a code unit falls in the control range.
#[inline]
pub fn is_control_code(unit: u16) -> bool {
    unit < 0x20
}

static CTRL_ID_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "secd" => "section definition",
    "cold" => "column definition",
    "tbl " => "table",
    "gso " => "drawing object",
    "$lin" => "line",
    "$rec" => "rectangle",
    "$ell" => "ellipse",
    "$arc" => "arc",
    "$pol" => "polygon",
    "$cur" => "curve",
    "$pic" => "picture",
    "$ole" => "ole object",
    "$con" => "container",
    "eqed" => "equation",
    "head" => "header",
    "foot" => "footer",
    "fn  " => "footnote",
    "en  " => "endnote",
    "atno" => "auto number",
    "nwno" => "new number",
    "pghd" => "page hiding",
    "pgct" => "page odd/even adjust",
    "pgnp" => "page number position",
    "idxm" => "index mark",
    "bokm" => "bookmark",
    "tcps" => "overlapping letters",
    "tdut" => "dutmal",
    "tcmt" => "hidden comment",
    "form" => "form object",
    "%unk" => "unknown field",
    "%dte" => "date field",
    "%ddt" => "document date field",
    "%pat" => "file path field",
    "%bmk" => "bookmark field",
    "%mmg" => "mail merge field",
    "%xrf" => "cross reference field",
    "%fmu" => "formula field",
    "%clk" => "click here field",
    "%smr" => "summary field",
    "%usr" => "user info field",
    "%hlk" => "hyperlink field",
    "%sig" => "signature field",
    "%toc" => "table of contents field",
    "%cpr" => "copyright field",
};

/// Four-character form of a control id, e.g. `"tbl "`.
///
/// Ids are stored as little-endian `u32` whose big-endian bytes spell the
/// name.
pub fn ctrl_id_string(id: u32) -> String {
    id.to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

/// Descriptive name of a control id, if known.
pub fn ctrl_id_name(id: u32) -> Option<&'static str> {
    CTRL_ID_NAMES.get(ctrl_id_string(id).as_str()).copied()
}

/// Build a control id from its four-character form.
pub const fn ctrl_id(tag: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hwp5_catalog_reservations() {
        let catalog = ControlCatalog::hwp5();
        assert_eq!(catalog.get(LINE_BREAK).unwrap().reserved, 0);
        assert_eq!(catalog.get(PARA_BREAK).unwrap().kind, ControlKind::Char);
        assert_eq!(catalog.get(TAB).unwrap().reserved, 7);
        assert_eq!(catalog.get(TAB).unwrap().kind, ControlKind::Inline);
        assert_eq!(catalog.get(DRAWING_TABLE).unwrap().kind, ControlKind::Extended);
        assert_eq!(catalog.get(FIELD_START).unwrap().name, "field_start");
        assert_eq!(catalog.get(FIXED_WIDTH_SPACE).unwrap().reserved, 0);
        assert!((0u16..32).all(|code| catalog.get(code).is_some()));
        assert!(catalog.get(0x20).is_none());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = ControlCatalog::empty().with(FIELD_START, ControlKind::Extended, 2, "field");
        assert_eq!(catalog.get(FIELD_START).unwrap().reserved, 2);
        assert!(catalog.get(TAB).is_none());
        assert!(ControlCatalog::hwp5().without(TAB).get(TAB).is_none());
        // out-of-range codes are ignored
        assert_eq!(ControlCatalog::empty().with(0x41, ControlKind::Char, 0, "A"), ControlCatalog::empty());
    }

    #[test]
    fn test_ctrl_ids() {
        let table = ctrl_id(b"tbl ");
        assert_eq!(table, 0x74626C20);
        assert_eq!(ctrl_id_string(table), "tbl ");
        assert_eq!(ctrl_id_name(table), Some("table"));
        assert_eq!(ctrl_id_name(ctrl_id(b"secd")), Some("section definition"));
        assert_eq!(ctrl_id_name(ctrl_id(b"zzzz")), None);
        assert_eq!(ctrl_id_string(0x0001_4142), "??AB");
    }
}
