//! Paragraph character-stream decoder.
//!
//! A `PARA_TEXT` payload is a sequence of UTF-16 code units. Runs of
//! ordinary units are text; a unit in the control range starts a control
//! that swallows a fixed number of following slots as opaque parameters,
//! even when those slots would otherwise read as printable text.

use super::control::{
    BOUND_SPACE, ControlCatalog, ControlKind, FIXED_WIDTH_SPACE, HYPHEN, LINE_BREAK, TAB,
    ctrl_id_name, ctrl_id_string, is_control_code,
};
use crate::common::error::{Error, Result};
use smallvec::SmallVec;

/// An inline control and the slots it reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Control code, `0x00..=0x1F`
    pub code: u16,
    pub kind: ControlKind,
    /// Character position of the control code in the paragraph
    pub position: usize,
    /// Reserved slots following the code, as raw code units
    pub inline_data: SmallVec<[u16; 7]>,
}

impl Control {
    /// Number of reserved slots after the code.
    #[inline]
    pub fn reserved_slots(&self) -> usize {
        self.inline_data.len()
    }

    /// Slots this control occupies, code included.
    #[inline]
    pub fn width(&self) -> usize {
        1 + self.inline_data.len()
    }

    /// Inline data as little-endian bytes.
    pub fn inline_bytes(&self) -> Vec<u8> {
        self.inline_data
            .iter()
            .flat_map(|unit| unit.to_le_bytes())
            .collect()
    }

    /// Control id carried in the first two parameter slots.
    ///
    /// Only inline and extended controls carry one.
    pub fn ctrl_id(&self) -> Option<u32> {
        if self.kind == ControlKind::Char || self.inline_data.len() < 2 {
            return None;
        }
        Some(u32::from(self.inline_data[0]) | (u32::from(self.inline_data[1]) << 16))
    }

    /// Four-character form of [`Control::ctrl_id`].
    pub fn ctrl_id_string(&self) -> Option<String> {
        self.ctrl_id().map(ctrl_id_string)
    }

    /// Descriptive name of the control id, if known.
    pub fn ctrl_id_name(&self) -> Option<&'static str> {
        self.ctrl_id().and_then(ctrl_id_name)
    }

    /// Plain-text rendering of char controls and tabs.
    pub fn as_text(&self) -> Option<char> {
        match self.code {
            TAB => Some('\t'),
            LINE_BREAK => Some('\n'),
            HYPHEN => Some('-'),
            BOUND_SPACE => Some('\u{00A0}'),
            FIXED_WIDTH_SPACE => Some(' '),
            _ => None,
        }
    }
}

/// One decoded unit of a paragraph's character stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharToken {
    /// A run of displayable UTF-16 code units
    Text(Vec<u16>),
    /// An inline control with its reserved data
    Control(Control),
}

impl CharToken {
    /// Character slots this token consumes.
    pub fn slots(&self) -> usize {
        match self {
            CharToken::Text(units) => units.len(),
            CharToken::Control(control) => control.width(),
        }
    }
}

/// Decode UTF-16 code units into a `String`, replacing unpaired surrogates.
pub fn decode_utf16(units: &[u16]) -> String {
    let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
    let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(&bytes);
    text.into_owned()
}

/// Render a token sequence as plain text.
pub fn tokens_to_string(tokens: &[CharToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            CharToken::Text(units) => out.push_str(&decode_utf16(units)),
            CharToken::Control(control) => {
                if let Some(ch) = control.as_text() {
                    out.push(ch);
                }
            },
        }
    }
    out
}

/// Splits a paragraph's code units into text runs and controls.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphCharDecoder<'c> {
    catalog: &'c ControlCatalog,
}

impl<'c> ParagraphCharDecoder<'c> {
    pub fn new(catalog: &'c ControlCatalog) -> Self {
        Self { catalog }
    }

    /// Decode `units`, which must fill exactly `declared` character slots.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownControl`] for a control code missing from the catalog
    /// - [`Error::UnterminatedControl`] when a reservation runs past the end
    /// - [`Error::CharCountMismatch`] when the slots consumed differ from
    ///   `declared`
    pub fn decode(&self, units: &[u16], declared: usize) -> Result<Vec<CharToken>> {
        let mut tokens = Vec::new();
        let mut run: Vec<u16> = Vec::new();
        let mut pos = 0;

        while pos < units.len() {
            let unit = units[pos];
            if !is_control_code(unit) {
                run.push(unit);
                pos += 1;
                continue;
            }

            let spec = self
                .catalog
                .get(unit)
                .ok_or(Error::UnknownControl {
                    position: pos,
                    code: unit,
                })?;
            let available = units.len() - pos - 1;
            if spec.reserved > available {
                return Err(Error::UnterminatedControl {
                    position: pos,
                    code: unit,
                    reserved: spec.reserved,
                    available,
                });
            }

            if !run.is_empty() {
                tokens.push(CharToken::Text(std::mem::take(&mut run)));
            }
            let data_end = pos + 1 + spec.reserved;
            tokens.push(CharToken::Control(Control {
                code: unit,
                kind: spec.kind,
                position: pos,
                inline_data: SmallVec::from_slice(&units[pos + 1..data_end]),
            }));
            pos = data_end;
        }

        if !run.is_empty() {
            tokens.push(CharToken::Text(run));
        }

        if pos != declared {
            return Err(Error::CharCountMismatch {
                declared,
                consumed: pos,
            });
        }
        Ok(tokens)
    }
}
