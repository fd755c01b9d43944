//! Constants for the HWP 5.0 format: record tags and stream names.

/// Signature at the start of the FileHeader stream, NUL-padded to 32 bytes.
pub const SIGNATURE: &[u8; 17] = b"HWP Document File";

/// Size of the FileHeader stream.
pub const FILE_HEADER_SIZE: usize = 256;

/// Name of the stream holding the fixed-layout file header.
pub const FILE_HEADER_STREAM: &str = "FileHeader";

/// Name of the document-info stream.
pub const DOC_INFO_STREAM: &str = "DocInfo";

/// Storage holding one stream per section.
pub const BODY_TEXT_STORAGE: &str = "BodyText";

/// Storage used instead of `BodyText` by distribution documents.
pub const VIEW_TEXT_STORAGE: &str = "ViewText";

/// Storage holding embedded binary objects.
pub const BIN_DATA_STORAGE: &str = "BinData";

/// Stream name of section `index` inside `storage`.
pub fn section_stream_name(storage: &str, index: usize) -> String {
    format!("{}/Section{}", storage, index)
}

fn in_storage(name: &str, storage: &str) -> bool {
    name.strip_prefix(storage)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether `name` is a record stream the header's compression and
/// encryption flags apply to.
///
/// Preview, summary and option streams are stored as is.
pub fn is_record_stream(name: &str) -> bool {
    name == DOC_INFO_STREAM
        || in_storage(name, BODY_TEXT_STORAGE)
        || in_storage(name, VIEW_TEXT_STORAGE)
}

/// Whether `name` is a distribution-document body stream, encrypted
/// whatever the header's encryption flag says.
pub fn is_view_text_stream(name: &str) -> bool {
    in_storage(name, VIEW_TEXT_STORAGE)
}

/// Record tag identifiers.
///
/// Values are the 10-bit tag ids from the record header. Ids the decoder
/// does not model still round-trip through [`HwpTag::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HwpTag {
    /// Document properties (section count, start numbers, caret)
    DocumentProperties,
    /// Counts of each DocInfo id-mapped table
    IdMappings,
    /// Binary data object descriptor
    BinData,
    /// Font face
    FaceName,
    /// Border and fill
    BorderFill,
    /// Character shape
    CharShape,
    /// Tab definition
    TabDef,
    /// Paragraph numbering
    Numbering,
    /// Bullet
    Bullet,
    /// Paragraph shape
    ParaShape,
    /// Style
    Style,
    /// Document arbitrary data
    DocData,
    /// Distribution document data
    DistributeDocData,
    /// Compatible document target
    CompatibleDocument,
    /// Layout compatibility
    LayoutCompatibility,
    /// Track change information
    TrackChangeInfo,
    /// Memo shape
    MemoShape,
    /// Forbidden characters
    ForbiddenChar,
    /// Track change content
    TrackChange,
    /// Track change author
    TrackChangeAuthor,

    /// Paragraph header
    ParaHeader,
    /// Paragraph character stream
    ParaText,
    /// Paragraph character shape runs
    ParaCharShape,
    /// Paragraph line segments
    ParaLineSeg,
    /// Paragraph range tags
    ParaRangeTag,
    /// Control header
    CtrlHeader,
    /// List header
    ListHeader,
    /// Page definition
    PageDef,
    /// Footnote/endnote shape
    FootnoteShape,
    /// Page border and fill
    PageBorderFill,
    /// Shape component
    ShapeComponent,
    /// Table
    Table,
    /// Line shape component
    ShapeComponentLine,
    /// Rectangle shape component
    ShapeComponentRectangle,
    /// Ellipse shape component
    ShapeComponentEllipse,
    /// Arc shape component
    ShapeComponentArc,
    /// Polygon shape component
    ShapeComponentPolygon,
    /// Curve shape component
    ShapeComponentCurve,
    /// OLE shape component
    ShapeComponentOle,
    /// Picture shape component
    ShapeComponentPicture,
    /// Container shape component
    ShapeComponentContainer,
    /// Control arbitrary data
    CtrlData,
    /// Equation editor
    EqEdit,
    /// Text art shape component
    ShapeComponentTextArt,
    /// Form object
    FormObject,
    /// Memo list
    MemoList,
    /// Chart data
    ChartData,
    /// Video data
    VideoData,
    /// Unknown shape component
    ShapeComponentUnknown,

    /// Any other tag id
    Unknown(u16),
}

impl From<u16> for HwpTag {
    fn from(value: u16) -> Self {
        match value {
            0x010 => HwpTag::DocumentProperties,
            0x011 => HwpTag::IdMappings,
            0x012 => HwpTag::BinData,
            0x013 => HwpTag::FaceName,
            0x014 => HwpTag::BorderFill,
            0x015 => HwpTag::CharShape,
            0x016 => HwpTag::TabDef,
            0x017 => HwpTag::Numbering,
            0x018 => HwpTag::Bullet,
            0x019 => HwpTag::ParaShape,
            0x01A => HwpTag::Style,
            0x01B => HwpTag::DocData,
            0x01C => HwpTag::DistributeDocData,
            0x01E => HwpTag::CompatibleDocument,
            0x01F => HwpTag::LayoutCompatibility,
            0x020 => HwpTag::TrackChangeInfo,
            0x05C => HwpTag::MemoShape,
            0x05E => HwpTag::ForbiddenChar,
            0x060 => HwpTag::TrackChange,
            0x061 => HwpTag::TrackChangeAuthor,

            0x042 => HwpTag::ParaHeader,
            0x043 => HwpTag::ParaText,
            0x044 => HwpTag::ParaCharShape,
            0x045 => HwpTag::ParaLineSeg,
            0x046 => HwpTag::ParaRangeTag,
            0x047 => HwpTag::CtrlHeader,
            0x048 => HwpTag::ListHeader,
            0x049 => HwpTag::PageDef,
            0x04A => HwpTag::FootnoteShape,
            0x04B => HwpTag::PageBorderFill,
            0x04C => HwpTag::ShapeComponent,
            0x04D => HwpTag::Table,
            0x04E => HwpTag::ShapeComponentLine,
            0x04F => HwpTag::ShapeComponentRectangle,
            0x050 => HwpTag::ShapeComponentEllipse,
            0x051 => HwpTag::ShapeComponentArc,
            0x052 => HwpTag::ShapeComponentPolygon,
            0x053 => HwpTag::ShapeComponentCurve,
            0x054 => HwpTag::ShapeComponentOle,
            0x055 => HwpTag::ShapeComponentPicture,
            0x056 => HwpTag::ShapeComponentContainer,
            0x057 => HwpTag::CtrlData,
            0x058 => HwpTag::EqEdit,
            0x05A => HwpTag::ShapeComponentTextArt,
            0x05B => HwpTag::FormObject,
            0x05D => HwpTag::MemoList,
            0x05F => HwpTag::ChartData,
            0x062 => HwpTag::VideoData,
            0x073 => HwpTag::ShapeComponentUnknown,

            other => HwpTag::Unknown(other),
        }
    }
}

impl HwpTag {
    /// Human-readable tag name, `HWPTAG_` prefix dropped.
    pub fn name(&self) -> &'static str {
        match self {
            HwpTag::DocumentProperties => "DOCUMENT_PROPERTIES",
            HwpTag::IdMappings => "ID_MAPPINGS",
            HwpTag::BinData => "BIN_DATA",
            HwpTag::FaceName => "FACE_NAME",
            HwpTag::BorderFill => "BORDER_FILL",
            HwpTag::CharShape => "CHAR_SHAPE",
            HwpTag::TabDef => "TAB_DEF",
            HwpTag::Numbering => "NUMBERING",
            HwpTag::Bullet => "BULLET",
            HwpTag::ParaShape => "PARA_SHAPE",
            HwpTag::Style => "STYLE",
            HwpTag::DocData => "DOC_DATA",
            HwpTag::DistributeDocData => "DISTRIBUTE_DOC_DATA",
            HwpTag::CompatibleDocument => "COMPATIBLE_DOCUMENT",
            HwpTag::LayoutCompatibility => "LAYOUT_COMPATIBILITY",
            HwpTag::TrackChangeInfo => "TRACKCHANGE",
            HwpTag::MemoShape => "MEMO_SHAPE",
            HwpTag::ForbiddenChar => "FORBIDDEN_CHAR",
            HwpTag::TrackChange => "TRACK_CHANGE",
            HwpTag::TrackChangeAuthor => "TRACK_CHANGE_AUTHOR",
            HwpTag::ParaHeader => "PARA_HEADER",
            HwpTag::ParaText => "PARA_TEXT",
            HwpTag::ParaCharShape => "PARA_CHAR_SHAPE",
            HwpTag::ParaLineSeg => "PARA_LINE_SEG",
            HwpTag::ParaRangeTag => "PARA_RANGE_TAG",
            HwpTag::CtrlHeader => "CTRL_HEADER",
            HwpTag::ListHeader => "LIST_HEADER",
            HwpTag::PageDef => "PAGE_DEF",
            HwpTag::FootnoteShape => "FOOTNOTE_SHAPE",
            HwpTag::PageBorderFill => "PAGE_BORDER_FILL",
            HwpTag::ShapeComponent => "SHAPE_COMPONENT",
            HwpTag::Table => "TABLE",
            HwpTag::ShapeComponentLine => "SHAPE_COMPONENT_LINE",
            HwpTag::ShapeComponentRectangle => "SHAPE_COMPONENT_RECTANGLE",
            HwpTag::ShapeComponentEllipse => "SHAPE_COMPONENT_ELLIPSE",
            HwpTag::ShapeComponentArc => "SHAPE_COMPONENT_ARC",
            HwpTag::ShapeComponentPolygon => "SHAPE_COMPONENT_POLYGON",
            HwpTag::ShapeComponentCurve => "SHAPE_COMPONENT_CURVE",
            HwpTag::ShapeComponentOle => "SHAPE_COMPONENT_OLE",
            HwpTag::ShapeComponentPicture => "SHAPE_COMPONENT_PICTURE",
            HwpTag::ShapeComponentContainer => "SHAPE_COMPONENT_CONTAINER",
            HwpTag::CtrlData => "CTRL_DATA",
            HwpTag::EqEdit => "EQEDIT",
            HwpTag::ShapeComponentTextArt => "SHAPE_COMPONENT_TEXTART",
            HwpTag::FormObject => "FORM_OBJECT",
            HwpTag::MemoList => "MEMO_LIST",
            HwpTag::ChartData => "CHART_DATA",
            HwpTag::VideoData => "VIDEO_DATA",
            HwpTag::ShapeComponentUnknown => "SHAPE_COMPONENT_UNKNOWN",
            HwpTag::Unknown(_) => "UNKNOWN",
        }
    }
}

pub const TAG_DOCUMENT_PROPERTIES: u16 = 0x010;
pub const TAG_ID_MAPPINGS: u16 = 0x011;
pub const TAG_BIN_DATA: u16 = 0x012;
pub const TAG_FACE_NAME: u16 = 0x013;
pub const TAG_BORDER_FILL: u16 = 0x014;
pub const TAG_COMPATIBLE_DOCUMENT: u16 = 0x01E;
pub const TAG_PARA_HEADER: u16 = 0x042;
pub const TAG_PARA_TEXT: u16 = 0x043;
pub const TAG_PARA_CHAR_SHAPE: u16 = 0x044;
pub const TAG_PARA_LINE_SEG: u16 = 0x045;
pub const TAG_PARA_RANGE_TAG: u16 = 0x046;
pub const TAG_CTRL_HEADER: u16 = 0x047;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_lookup() {
        assert_eq!(HwpTag::from(0x010), HwpTag::DocumentProperties);
        assert_eq!(HwpTag::from(TAG_PARA_HEADER), HwpTag::ParaHeader);
        assert_eq!(HwpTag::from(0x043).name(), "PARA_TEXT");
        // 0x01D is a hole in the documented range
        assert_eq!(HwpTag::from(0x01D), HwpTag::Unknown(0x01D));
        assert_eq!(HwpTag::from(0x3FF).name(), "UNKNOWN");
    }

    #[test]
    fn test_tag_ids_match_enum() {
        let ids = [
            (TAG_DOCUMENT_PROPERTIES, HwpTag::DocumentProperties),
            (TAG_ID_MAPPINGS, HwpTag::IdMappings),
            (TAG_BIN_DATA, HwpTag::BinData),
            (TAG_FACE_NAME, HwpTag::FaceName),
            (TAG_BORDER_FILL, HwpTag::BorderFill),
            (TAG_COMPATIBLE_DOCUMENT, HwpTag::CompatibleDocument),
            (TAG_PARA_HEADER, HwpTag::ParaHeader),
            (TAG_PARA_TEXT, HwpTag::ParaText),
            (TAG_PARA_CHAR_SHAPE, HwpTag::ParaCharShape),
            (TAG_PARA_LINE_SEG, HwpTag::ParaLineSeg),
            (TAG_PARA_RANGE_TAG, HwpTag::ParaRangeTag),
            (TAG_CTRL_HEADER, HwpTag::CtrlHeader),
        ];
        for (id, tag) in ids {
            assert_eq!(HwpTag::from(id), tag, "tag id {id:#05x}");
        }
    }

    #[test]
    fn test_record_stream_names() {
        for name in [DOC_INFO_STREAM, "BodyText/Section0", "ViewText/Section3"] {
            assert!(is_record_stream(name), "{name}");
        }
        for name in [
            FILE_HEADER_STREAM,
            "PrvText",
            "PrvImage",
            "\u{5}HwpSummaryInformation",
            "DocOptions/_LinkDoc",
            "BinData/BIN0001.png",
            "BodyTextX/Section0",
        ] {
            assert!(!is_record_stream(name), "{name}");
        }
        assert!(is_view_text_stream("ViewText/Section0"));
        assert!(!is_view_text_stream("BodyText/Section0"));
    }

    #[test]
    fn test_section_names() {
        assert_eq!(section_stream_name(BODY_TEXT_STORAGE, 0), "BodyText/Section0");
        assert_eq!(section_stream_name(VIEW_TEXT_STORAGE, 12), "ViewText/Section12");
    }
}
