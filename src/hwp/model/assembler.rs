//! Assembly of typed model nodes from a record tree.
//!
//! Each record is decoded by tag. A record that fails to decode is either
//! returned as an error (strict mode) or kept as an opaque node and noted as
//! a [`SubtreeFailure`]; its siblings and children are assembled as usual.

use super::docinfo::{
    BinData, BorderFill, CompatibleDocument, DocumentProperties, FaceName, IdMappings,
};
use super::node::{Node, NodeKind};
use super::paragraph::{CharShapeRun, CtrlHeader, LineSeg, ParaHeader, RangeTag};
use crate::common::binary::read_code_units;
use crate::common::error::{Error, Result};
use crate::hwp::consts::{HwpTag, TAG_PARA_TEXT};
use crate::hwp::records::{NodeId, Record, RecordTree};
use crate::hwp::text::{ControlCatalog, ParagraphCharDecoder};

/// A record or stream that could not be decoded.
#[derive(Debug)]
pub struct SubtreeFailure {
    /// Stream the failure occurred in
    pub stream: String,
    /// Tag of the failing record, when a single record failed
    pub tag_id: Option<u16>,
    /// Byte offset of the failing record or structure in its stream
    pub offset: Option<usize>,
    pub error: Error,
}

impl SubtreeFailure {
    /// Failure of a single record.
    pub fn record(stream: &str, record: &Record, error: Error) -> Self {
        Self {
            stream: stream.to_string(),
            tag_id: Some(record.tag_id),
            offset: Some(record.offset),
            error,
        }
    }

    /// Failure of a whole stream; position is taken from the error.
    pub fn stream(stream: &str, error: Error) -> Self {
        let (tag_id, offset) = match error.root() {
            Error::TruncatedRecord { tag_id, offset, .. }
            | Error::LevelSkip { tag_id, offset, .. } => (Some(*tag_id), Some(*offset)),
            Error::TruncatedHeader { offset, .. } => (None, Some(*offset)),
            _ => (None, None),
        };
        Self {
            stream: stream.to_string(),
            tag_id,
            offset,
            error,
        }
    }
}

/// Builds model nodes from a [`RecordTree`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentModelAssembler<'c> {
    decoder: ParagraphCharDecoder<'c>,
    strict: bool,
}

impl<'c> DocumentModelAssembler<'c> {
    pub fn new(catalog: &'c ControlCatalog, strict: bool) -> Self {
        Self {
            decoder: ParagraphCharDecoder::new(catalog),
            strict,
        }
    }

    /// Assemble the forest of one stream.
    ///
    /// In strict mode the first record error is returned, tagged with
    /// `stream`. Otherwise failures are appended to `failures`.
    pub fn assemble(
        &self,
        stream: &str,
        tree: &RecordTree,
        failures: &mut Vec<SubtreeFailure>,
    ) -> Result<Vec<Node>> {
        tree.roots()
            .iter()
            .map(|&id| self.node(stream, tree, id, None, failures))
            .collect()
    }

    fn node(
        &self,
        stream: &str,
        tree: &RecordTree,
        id: NodeId,
        paragraph: Option<&ParaHeader>,
        failures: &mut Vec<SubtreeFailure>,
    ) -> Result<Node> {
        let record = &tree.node(id).record;
        let kind = match self.decode(record, paragraph) {
            Ok(kind) => kind,
            Err(err) => {
                let err = err.for_tag(record.tag_id);
                if self.strict {
                    return Err(err.in_stream(stream));
                }
                log::debug!(
                    "{}: {} record at offset {} left undecoded: {}",
                    stream,
                    record.tag().name(),
                    record.offset,
                    err
                );
                failures.push(SubtreeFailure::record(stream, record, err));
                NodeKind::Opaque
            },
        };

        let context = match &kind {
            NodeKind::ParaHeader(header) => Some(header),
            _ => None,
        };
        let children = tree
            .children(id)
            .iter()
            .map(|&child| self.node(stream, tree, child, context, failures))
            .collect::<Result<Vec<_>>>()?;

        Ok(Node {
            record: record.clone(),
            kind,
            children,
        })
    }

    /// Decode one record; `paragraph` is the header of the enclosing
    /// paragraph, if any.
    fn decode(&self, record: &Record, paragraph: Option<&ParaHeader>) -> Result<NodeKind> {
        let payload = &record.payload;
        Ok(match record.tag() {
            HwpTag::DocumentProperties => {
                NodeKind::DocumentProperties(DocumentProperties::parse(payload)?)
            },
            HwpTag::IdMappings => NodeKind::IdMappings(IdMappings::parse(payload)?),
            HwpTag::BinData => NodeKind::BinData(BinData::parse(payload)?),
            HwpTag::FaceName => NodeKind::FaceName(FaceName::parse(payload)?),
            HwpTag::BorderFill => NodeKind::BorderFill(BorderFill::parse(payload)?),
            HwpTag::CompatibleDocument => {
                NodeKind::CompatibleDocument(CompatibleDocument::parse(payload)?)
            },
            HwpTag::ParaHeader => NodeKind::ParaHeader(ParaHeader::parse(payload)?),
            HwpTag::ParaText => {
                if payload.len() % 2 != 0 {
                    return Err(Error::RecordSizeMismatch {
                        tag_id: TAG_PARA_TEXT,
                        expected: payload.len() - 1,
                        actual: payload.len(),
                    });
                }
                let units = read_code_units(payload);
                let declared = paragraph.map_or(units.len(), ParaHeader::char_count);
                NodeKind::ParaText(self.decoder.decode(&units, declared)?)
            },
            HwpTag::ParaCharShape => NodeKind::ParaCharShape(CharShapeRun::parse_table(
                payload,
                paragraph.map(|h| h.char_shape_count),
            )?),
            HwpTag::ParaLineSeg => NodeKind::ParaLineSeg(LineSeg::parse_table(
                payload,
                paragraph.map(|h| h.line_seg_count),
            )?),
            HwpTag::ParaRangeTag => NodeKind::ParaRangeTag(RangeTag::parse_table(
                payload,
                paragraph.map(|h| h.range_tag_count),
            )?),
            HwpTag::CtrlHeader => NodeKind::CtrlHeader(CtrlHeader::parse(payload)?),
            _ => NodeKind::Opaque,
        })
    }
}
