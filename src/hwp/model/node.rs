//! Model nodes: a record, its typed decoding and its children.

use super::docinfo::{
    BinData, BorderFill, CompatibleDocument, DocumentProperties, FaceName, IdMappings,
};
use super::paragraph::{CharShapeRun, CtrlHeader, LineSeg, ParaHeader, RangeTag};
use crate::hwp::consts::HwpTag;
use crate::hwp::records::Record;
use crate::hwp::text::{CharToken, tokens_to_string};

/// Typed content of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    DocumentProperties(DocumentProperties),
    IdMappings(IdMappings),
    BinData(BinData),
    FaceName(FaceName),
    BorderFill(BorderFill),
    CompatibleDocument(CompatibleDocument),
    ParaHeader(ParaHeader),
    ParaText(Vec<CharToken>),
    ParaCharShape(Vec<CharShapeRun>),
    ParaLineSeg(Vec<LineSeg>),
    ParaRangeTag(Vec<RangeTag>),
    CtrlHeader(CtrlHeader),
    /// Not decoded: an unmodelled tag, or a record that failed to decode
    Opaque,
}

/// One record of the model tree.
///
/// The raw record is kept next to its typed form so the stream can be
/// written back byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub record: Record,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    #[inline]
    pub fn tag(&self) -> HwpTag {
        self.record.tag()
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        matches!(self.kind, NodeKind::Opaque)
    }

    /// Paragraph view, if this node is a decoded `PARA_HEADER`.
    pub fn as_paragraph(&self) -> Option<Paragraph<'_>> {
        match &self.kind {
            NodeKind::ParaHeader(header) => Some(Paragraph { node: self, header }),
            _ => None,
        }
    }

    /// This node and its descendants in stream order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order iterator over a node forest.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Walk<'a> {
    /// Walk several sibling roots in order.
    pub fn forest(nodes: &'a [Node]) -> Self {
        Self {
            stack: nodes.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A `PARA_HEADER` node seen as a paragraph.
#[derive(Debug, Clone, Copy)]
pub struct Paragraph<'a> {
    node: &'a Node,
    header: &'a ParaHeader,
}

impl<'a> Paragraph<'a> {
    pub fn header(&self) -> &'a ParaHeader {
        self.header
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    fn child<T>(&self, pick: impl Fn(&'a NodeKind) -> Option<T>) -> Option<T> {
        self.node.children.iter().find_map(|child| pick(&child.kind))
    }

    /// Decoded character stream; empty when the paragraph has no text
    /// record or it failed to decode.
    pub fn tokens(&self) -> &'a [CharToken] {
        self.child(|kind| match kind {
            NodeKind::ParaText(tokens) => Some(tokens.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
    }

    /// Plain text of the paragraph, controls rendered where they have a
    /// textual form.
    pub fn text(&self) -> String {
        tokens_to_string(self.tokens())
    }

    pub fn char_shapes(&self) -> &'a [CharShapeRun] {
        self.child(|kind| match kind {
            NodeKind::ParaCharShape(runs) => Some(runs.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
    }

    pub fn line_segs(&self) -> &'a [LineSeg] {
        self.child(|kind| match kind {
            NodeKind::ParaLineSeg(segs) => Some(segs.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
    }

    pub fn range_tags(&self) -> &'a [RangeTag] {
        self.child(|kind| match kind {
            NodeKind::ParaRangeTag(tags) => Some(tags.as_slice()),
            _ => None,
        })
        .unwrap_or(&[])
    }

    /// `CTRL_HEADER` children in stream order.
    pub fn controls(self) -> impl Iterator<Item = (&'a Node, &'a CtrlHeader)> + 'a {
        self.node.children.iter().filter_map(|child| match &child.kind {
            NodeKind::CtrlHeader(ctrl) => Some((child, ctrl)),
            _ => None,
        })
    }

    /// Paragraphs nested inside this paragraph's controls (table cells,
    /// headers, footnotes, text boxes), outermost first.
    pub fn nested_paragraphs(&self) -> Vec<Paragraph<'a>> {
        self.node
            .children
            .iter()
            .flat_map(|child| child.walk())
            .filter_map(Node::as_paragraph)
            .collect()
    }

    /// Whether any direct child failed to decode.
    pub fn has_opaque_children(&self) -> bool {
        self.node.children.iter().any(|child| {
            child.is_opaque() && !matches!(child.tag(), HwpTag::Unknown(_))
        })
    }
}
