//! Level-based reconstruction of the record tree.
//!
//! Streams carry no pointers: nesting is implied by each record's level. The
//! builder keeps a stack of open ancestors; a record at level `L` closes
//! everything at depth `>= L`, attaches under the ancestor at `L - 1` and
//! becomes the new open node at depth `L`.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`].

use super::record::Record;
use crate::common::error::{Error, Result};

/// Index of a node in a [`RecordTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A record plus its position in the tree.
#[derive(Debug, Clone)]
pub struct RecordNode {
    pub record: Record,
    /// Parent node; `None` for roots
    pub parent: Option<NodeId>,
    /// Children in stream order
    pub children: Vec<NodeId>,
}

/// Arena-backed record forest of one stream.
#[derive(Debug, Clone, Default)]
pub struct RecordTree {
    nodes: Vec<RecordNode>,
    roots: Vec<NodeId>,
}

impl RecordTree {
    /// Build the forest from records in stream order.
    ///
    /// Fails with [`Error::LevelSkip`] when a record's level is deeper than
    /// the open ancestor chain allows. No other parent is ever guessed.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        let records = records.into_iter();
        let mut tree = RecordTree {
            nodes: Vec::with_capacity(records.size_hint().0),
            roots: Vec::new(),
        };
        let mut open: Vec<NodeId> = Vec::new();

        for record in records {
            let record = record?;
            let level = record.level as usize;
            if level > open.len() {
                return Err(Error::LevelSkip {
                    offset: record.offset,
                    tag_id: record.tag_id,
                    level: record.level,
                    depth: open.len(),
                });
            }
            open.truncate(level);

            let id = NodeId(tree.nodes.len());
            let parent = open.last().copied();
            tree.nodes.push(RecordNode {
                record,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(parent) => tree.nodes[parent.0].children.push(id),
                None => tree.roots.push(id),
            }
            open.push(id);
        }

        Ok(tree)
    }

    /// Root nodes (level 0) in stream order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &RecordNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&RecordNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of ancestors above `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Total node count.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in stream order (pre-order of the forest).
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &RecordNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Records in stream order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.nodes.iter().map(|n| &n.record)
    }
}
