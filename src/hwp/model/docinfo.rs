//! Typed DocInfo records.
//!
//! Each decoder takes the record payload and checks it against the widths
//! its fields declare; a mismatch is a [`Error::RecordSizeMismatch`].

use super::expect_size;
use crate::common::binary::{read_prefixed_wstring, read_u8, read_u16_le, read_u32_le};
use crate::common::bitfield::{BitRange, BitfieldView};
use crate::common::error::{Error, Result};
use crate::hwp::consts::{
    BIN_DATA_STORAGE, TAG_BIN_DATA, TAG_BORDER_FILL, TAG_COMPATIBLE_DOCUMENT,
    TAG_DOCUMENT_PROPERTIES, TAG_FACE_NAME, TAG_ID_MAPPINGS,
};
use bytes::Bytes;

/// Document-wide numbering starts and caret position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentProperties {
    pub section_count: u16,
    pub page_start: u16,
    pub footnote_start: u16,
    pub endnote_start: u16,
    pub picture_start: u16,
    pub table_start: u16,
    pub equation_start: u16,
    /// List id of the caret
    pub caret_list_id: u32,
    /// Paragraph id of the caret
    pub caret_paragraph_id: u32,
    /// Character position of the caret within its paragraph
    pub caret_char_pos: u32,
}

impl DocumentProperties {
    pub const SIZE: usize = 26;

    pub fn parse(payload: &[u8]) -> Result<Self> {
        expect_size(TAG_DOCUMENT_PROPERTIES, payload, Self::SIZE)?;
        Ok(Self {
            section_count: read_u16_le(payload, 0)?,
            page_start: read_u16_le(payload, 2)?,
            footnote_start: read_u16_le(payload, 4)?,
            endnote_start: read_u16_le(payload, 6)?,
            picture_start: read_u16_le(payload, 8)?,
            table_start: read_u16_le(payload, 10)?,
            equation_start: read_u16_le(payload, 12)?,
            caret_list_id: read_u32_le(payload, 14)?,
            caret_paragraph_id: read_u32_le(payload, 18)?,
            caret_char_pos: read_u32_le(payload, 22)?,
        })
    }
}

/// Tables counted by `ID_MAPPINGS`, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMappingKind {
    BinData,
    HangulFont,
    LatinFont,
    HanjaFont,
    JapaneseFont,
    OtherFont,
    SymbolFont,
    UserFont,
    BorderFill,
    CharShape,
    TabDef,
    Numbering,
    Bullet,
    ParaShape,
    Style,
    /// Present from 5.0.2.1
    MemoShape,
    /// Present from 5.0.3.2
    TrackChange,
    /// Present from 5.0.3.2
    TrackChangeAuthor,
}

/// Counts of every id-mapped DocInfo table.
///
/// Older files carry fewer entries; missing counts read as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdMappings {
    counts: Vec<i32>,
}

impl IdMappings {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.is_empty() || payload.len() % 4 != 0 {
            return Err(Error::RecordSizeMismatch {
                tag_id: TAG_ID_MAPPINGS,
                expected: payload.len().div_ceil(4).max(1) * 4,
                actual: payload.len(),
            });
        }
        let counts = payload
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { counts })
    }

    pub fn count(&self, kind: IdMappingKind) -> Option<i32> {
        self.counts.get(kind as usize).copied()
    }

    /// Raw counts in record order.
    pub fn counts(&self) -> &[i32] {
        &self.counts
    }
}

pub const BIN_TYPE: BitRange = BitRange::value(0, 4, "type");
pub const BIN_COMPRESSION: BitRange = BitRange::value(4, 2, "compression");
pub const BIN_ACCESS: BitRange = BitRange::value(8, 2, "access_state");

pub const BIN_DATA_PROPERTIES: [BitRange; 3] = [BIN_TYPE, BIN_COMPRESSION, BIN_ACCESS];

/// Where a binary object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinDataType {
    /// External file referenced by path
    Link,
    /// Stream in the `BinData` storage
    Embedding,
    /// OLE storage in the `BinData` storage
    Storage,
    Unknown(u8),
}

/// Compression policy of a binary object's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinCompression {
    /// Follow the document's compressed flag
    Default,
    Always,
    Never,
    Unknown(u8),
}

/// Result of the last attempt to load the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinAccess {
    NotAccessed,
    Succeeded,
    Failed,
    FailedIgnored,
}

/// `BIN_DATA` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinData {
    pub properties: u16,
    /// Absolute and relative paths of a link
    pub link: Option<(String, String)>,
    /// Id of the embedded stream or storage
    pub bin_id: Option<u16>,
    /// File extension of an embedded stream, e.g. `jpg`
    pub extension: Option<String>,
}

impl BinData {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let properties = read_u16_le(payload, 0)?;
        let mut offset = 2;
        let mut bin = Self {
            properties,
            link: None,
            bin_id: None,
            extension: None,
        };

        match bin.data_type() {
            BinDataType::Link => {
                let absolute = read_prefixed_wstring(payload, &mut offset)?;
                let relative = read_prefixed_wstring(payload, &mut offset)?;
                bin.link = Some((absolute, relative));
            },
            BinDataType::Embedding => {
                bin.bin_id = Some(read_u16_le(payload, offset)?);
                offset += 2;
                bin.extension = Some(read_prefixed_wstring(payload, &mut offset)?);
            },
            BinDataType::Storage => {
                bin.bin_id = Some(read_u16_le(payload, offset)?);
                offset += 2;
            },
            BinDataType::Unknown(_) => offset = payload.len(),
        }

        expect_size(TAG_BIN_DATA, payload, offset)?;
        Ok(bin)
    }

    fn view(&self) -> BitfieldView {
        BitfieldView::new(self.properties)
    }

    pub fn data_type(&self) -> BinDataType {
        match self.view().get(BIN_TYPE) {
            0 => BinDataType::Link,
            1 => BinDataType::Embedding,
            2 => BinDataType::Storage,
            other => BinDataType::Unknown(other as u8),
        }
    }

    pub fn compression(&self) -> BinCompression {
        match self.view().get(BIN_COMPRESSION) {
            0 => BinCompression::Default,
            1 => BinCompression::Always,
            2 => BinCompression::Never,
            other => BinCompression::Unknown(other as u8),
        }
    }

    pub fn access(&self) -> BinAccess {
        match self.view().get(BIN_ACCESS) {
            0 => BinAccess::NotAccessed,
            1 => BinAccess::Succeeded,
            2 => BinAccess::Failed,
            _ => BinAccess::FailedIgnored,
        }
    }

    /// Name of the `BinData` stream holding an embedded object.
    pub fn stream_name(&self) -> Option<String> {
        let id = self.bin_id?;
        let extension = self.extension.as_deref()?;
        Some(format!(
            "{}/BIN{:04X}.{}",
            BIN_DATA_STORAGE,
            id,
            extension.to_ascii_lowercase()
        ))
    }
}

pub const FACE_ALTERNATE: BitRange = BitRange::flag(7, "has_alternate");
pub const FACE_TYPE_INFO: BitRange = BitRange::flag(6, "has_type_info");
pub const FACE_DEFAULT: BitRange = BitRange::flag(5, "has_default");

pub const FACE_NAME_PROPERTIES: [BitRange; 3] = [FACE_ALTERNATE, FACE_TYPE_INFO, FACE_DEFAULT];

/// `FACE_NAME` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceName {
    pub properties: u8,
    pub name: String,
    /// Alternate font kind and name
    pub alternate: Option<(u8, String)>,
    /// PANOSE-like type information
    pub type_info: Option<[u8; 10]>,
    pub default_name: Option<String>,
}

impl FaceName {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let properties = read_u8(payload, 0)?;
        let view = BitfieldView::new(properties);
        let mut offset = 1;

        let name = read_prefixed_wstring(payload, &mut offset)?;
        let alternate = if view.flag(FACE_ALTERNATE) {
            let kind = read_u8(payload, offset)?;
            offset += 1;
            Some((kind, read_prefixed_wstring(payload, &mut offset)?))
        } else {
            None
        };
        let type_info = if view.flag(FACE_TYPE_INFO) {
            let bytes = payload
                .get(offset..offset + 10)
                .ok_or(Error::RecordSizeMismatch {
                    tag_id: TAG_FACE_NAME,
                    expected: offset + 10,
                    actual: payload.len(),
                })?;
            offset += 10;
            let mut info = [0u8; 10];
            info.copy_from_slice(bytes);
            Some(info)
        } else {
            None
        };
        let default_name = if view.flag(FACE_DEFAULT) {
            Some(read_prefixed_wstring(payload, &mut offset)?)
        } else {
            None
        };

        expect_size(TAG_FACE_NAME, payload, offset)?;
        Ok(Self {
            properties,
            name,
            alternate,
            type_info,
            default_name,
        })
    }
}

pub const BORDER_3D: BitRange = BitRange::flag(0, "three_d");
pub const BORDER_SHADOW: BitRange = BitRange::flag(1, "shadow");
pub const SLASH_SHAPE: BitRange = BitRange::value(2, 3, "slash_shape");
pub const BACKSLASH_SHAPE: BitRange = BitRange::value(5, 3, "backslash_shape");
pub const SLASH_BENT: BitRange = BitRange::value(8, 2, "slash_bent");
pub const BACKSLASH_BENT: BitRange = BitRange::flag(10, "backslash_bent");
pub const SLASH_ROTATED: BitRange = BitRange::flag(11, "slash_rotated");
pub const BACKSLASH_ROTATED: BitRange = BitRange::flag(12, "backslash_rotated");
pub const CENTER_LINE: BitRange = BitRange::flag(13, "center_line");

pub const BORDER_FILL_PROPERTIES: [BitRange; 9] = [
    BORDER_3D,
    BORDER_SHADOW,
    SLASH_SHAPE,
    BACKSLASH_SHAPE,
    SLASH_BENT,
    BACKSLASH_BENT,
    SLASH_ROTATED,
    BACKSLASH_ROTATED,
    CENTER_LINE,
];

/// One border line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderLine {
    pub line_type: u8,
    pub thickness: u8,
    /// `0x00BBGGRR`
    pub color: u32,
}

impl BorderLine {
    const SIZE: usize = 6;

    fn parse(payload: &[u8], offset: usize) -> Result<Self> {
        Ok(Self {
            line_type: read_u8(payload, offset)?,
            thickness: read_u8(payload, offset + 1)?,
            color: read_u32_le(payload, offset + 2)?,
        })
    }
}

/// `BORDER_FILL` record. The fill description is kept undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderFill {
    pub properties: u16,
    /// Left, right, top, bottom
    pub borders: [BorderLine; 4],
    pub diagonal: BorderLine,
    pub fill: Bytes,
}

impl BorderFill {
    /// Property word plus five border lines.
    pub const FIXED_SIZE: usize = 2 + 5 * BorderLine::SIZE;

    pub fn parse(payload: &Bytes) -> Result<Self> {
        if payload.len() < Self::FIXED_SIZE {
            return Err(Error::RecordSizeMismatch {
                tag_id: TAG_BORDER_FILL,
                expected: Self::FIXED_SIZE,
                actual: payload.len(),
            });
        }
        let mut borders = [BorderLine::default(); 4];
        for (i, border) in borders.iter_mut().enumerate() {
            *border = BorderLine::parse(payload, 2 + i * BorderLine::SIZE)?;
        }
        Ok(Self {
            properties: read_u16_le(payload, 0)?,
            borders,
            diagonal: BorderLine::parse(payload, 2 + 4 * BorderLine::SIZE)?,
            fill: payload.slice(Self::FIXED_SIZE..),
        })
    }

    /// Read one property range from [`BORDER_FILL_PROPERTIES`].
    pub fn property(&self, range: BitRange) -> u64 {
        BitfieldView::new(self.properties).get(range)
    }

    pub fn has_3d_effect(&self) -> bool {
        self.property(BORDER_3D) != 0
    }

    pub fn has_shadow(&self) -> bool {
        self.property(BORDER_SHADOW) != 0
    }
}

/// Program whose layout the document imitates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibleDocument {
    Hwp,
    Hwp2007,
    MsWord,
    Unknown(u32),
}

impl CompatibleDocument {
    pub const SIZE: usize = 4;

    pub fn parse(payload: &[u8]) -> Result<Self> {
        expect_size(TAG_COMPATIBLE_DOCUMENT, payload, Self::SIZE)?;
        Ok(match read_u32_le(payload, 0)? {
            0 => CompatibleDocument::Hwp,
            1 => CompatibleDocument::Hwp2007,
            2 => CompatibleDocument::MsWord,
            other => CompatibleDocument::Unknown(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::bitfield::table_is_disjoint;

    fn wstring(text: &str) -> Vec<u8> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut out = (units.len() as u16).to_le_bytes().to_vec();
        out.extend(units.iter().flat_map(|u| u.to_le_bytes()));
        out
    }

    #[test]
    fn test_document_properties() {
        let mut payload = Vec::new();
        for v in [3u16, 1, 1, 1, 1, 1, 1] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0u32, 7, 12] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let props = DocumentProperties::parse(&payload).unwrap();
        assert_eq!(props.section_count, 3);
        assert_eq!(props.caret_paragraph_id, 7);
        assert_eq!(props.caret_char_pos, 12);

        payload.push(0);
        assert!(matches!(
            DocumentProperties::parse(&payload),
            Err(Error::RecordSizeMismatch {
                tag_id: TAG_DOCUMENT_PROPERTIES,
                expected: 26,
                actual: 27
            })
        ));
    }

    #[test]
    fn test_id_mappings() {
        let payload: Vec<u8> = (0..18i32).flat_map(|v| v.to_le_bytes()).collect();
        let mappings = IdMappings::parse(&payload).unwrap();
        assert_eq!(mappings.count(IdMappingKind::BinData), Some(0));
        assert_eq!(mappings.count(IdMappingKind::CharShape), Some(9));
        assert_eq!(mappings.count(IdMappingKind::TrackChangeAuthor), Some(17));

        let short = IdMappings::parse(&payload[..60]).unwrap();
        assert_eq!(short.count(IdMappingKind::MemoShape), None);

        assert!(matches!(
            IdMappings::parse(&payload[..6]),
            Err(Error::RecordSizeMismatch { expected: 8, actual: 6, .. })
        ));
    }

    #[test]
    fn test_bin_data_embedding() {
        // type 1 (embedding), compression 2 (never), access 1 (succeeded)
        let mut payload = (0x0121u16).to_le_bytes().to_vec();
        payload.extend_from_slice(&3u16.to_le_bytes());
        payload.extend(wstring("PNG"));

        let bin = BinData::parse(&payload).unwrap();
        assert_eq!(bin.data_type(), BinDataType::Embedding);
        assert_eq!(bin.compression(), BinCompression::Never);
        assert_eq!(bin.access(), BinAccess::Succeeded);
        assert_eq!(bin.bin_id, Some(3));
        assert_eq!(bin.stream_name().as_deref(), Some("BinData/BIN0003.png"));
    }

    #[test]
    fn test_bin_data_link_and_access_codes() {
        let mut payload = (0x0300u16).to_le_bytes().to_vec();
        payload.extend(wstring("C:\\a.jpg"));
        payload.extend(wstring("a.jpg"));
        let bin = BinData::parse(&payload).unwrap();
        assert_eq!(bin.data_type(), BinDataType::Link);
        assert_eq!(bin.access(), BinAccess::FailedIgnored);
        assert_eq!(bin.compression(), BinCompression::Default);
        assert_eq!(
            bin.link,
            Some(("C:\\a.jpg".to_string(), "a.jpg".to_string()))
        );
        assert_eq!(bin.stream_name(), None);

        payload.push(0);
        assert!(matches!(
            BinData::parse(&payload),
            Err(Error::RecordSizeMismatch { tag_id: TAG_BIN_DATA, .. })
        ));
        assert!(table_is_disjoint(&BIN_DATA_PROPERTIES));
    }

    #[test]
    fn test_face_name_optional_parts() {
        let mut payload = vec![0b1010_0000u8];
        payload.extend(wstring("함초롬바탕"));
        payload.push(1);
        payload.extend(wstring("Batang"));
        payload.extend(wstring("바탕"));

        let face = FaceName::parse(&payload).unwrap();
        assert_eq!(face.name, "함초롬바탕");
        assert_eq!(face.alternate, Some((1, "Batang".to_string())));
        assert_eq!(face.type_info, None);
        assert_eq!(face.default_name.as_deref(), Some("바탕"));
        assert!(table_is_disjoint(&FACE_NAME_PROPERTIES));

        let mut typed = vec![0b0100_0000u8];
        typed.extend(wstring("A"));
        typed.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(
            FaceName::parse(&typed),
            Err(Error::RecordSizeMismatch { tag_id: TAG_FACE_NAME, .. })
        ));
    }

    #[test]
    fn test_border_fill_properties() {
        // shadow, slash shape 0b101, slash bent 2, center line
        let properties: u16 = 0b10 | (0b101 << 2) | (2 << 8) | (1 << 13);
        let mut payload = properties.to_le_bytes().to_vec();
        for i in 0..5u8 {
            payload.extend_from_slice(&[i, i + 10]);
            payload.extend_from_slice(&0x00FF0000u32.to_le_bytes());
        }
        payload.extend_from_slice(&[0xEE; 4]);

        let fill = BorderFill::parse(&Bytes::from(payload)).unwrap();
        assert!(!fill.has_3d_effect());
        assert!(fill.has_shadow());
        assert_eq!(fill.property(SLASH_SHAPE), 0b101);
        assert_eq!(fill.property(BACKSLASH_SHAPE), 0);
        assert_eq!(fill.property(SLASH_BENT), 2);
        assert_eq!(fill.property(CENTER_LINE), 1);
        assert_eq!(fill.borders[3].line_type, 3);
        assert_eq!(fill.diagonal.thickness, 14);
        assert_eq!(fill.diagonal.color, 0x00FF0000);
        assert_eq!(fill.fill.as_ref(), &[0xEE; 4]);
        assert!(table_is_disjoint(&BORDER_FILL_PROPERTIES));

        assert!(BorderFill::parse(&Bytes::from_static(&[0u8; 10])).is_err());
    }

    fn border_fill(properties: u16) -> BorderFill {
        let mut payload = properties.to_le_bytes().to_vec();
        payload.resize(BorderFill::FIXED_SIZE, 0);
        BorderFill::parse(&Bytes::from(payload)).unwrap()
    }

    #[test]
    fn test_every_border_fill_range_reads_alone() {
        for range in BORDER_FILL_PROPERTIES {
            let fill = border_fill(range.mask() as u16);
            let full = range.mask() >> range.start;
            for other in BORDER_FILL_PROPERTIES {
                let expected = if other.name == range.name { full } else { 0 };
                assert_eq!(
                    fill.property(other),
                    expected,
                    "{} set, {} read",
                    range.name,
                    other.name
                );
            }
            let flags = BitfieldView::new(fill.properties).set_flags(&BORDER_FILL_PROPERTIES);
            if range.width == 1 {
                assert_eq!(flags, vec![range.name]);
            } else {
                assert!(flags.is_empty(), "{}", range.name);
            }
        }
        assert!(border_fill(1 << 0).has_3d_effect());
        assert_eq!(border_fill(0b011 << 5).property(BACKSLASH_SHAPE), 0b011);
    }

    #[test]
    fn test_compatible_document() {
        assert_eq!(
            CompatibleDocument::parse(&2u32.to_le_bytes()).unwrap(),
            CompatibleDocument::MsWord
        );
        assert!(CompatibleDocument::parse(&[0, 0]).is_err());
    }
}
