//! Analysis result trees.
//!
//! The analysis engine produces one tree per table (damage out, damage taken,
//! heal out, heal in). Nodes live in a single arena owned by the tree and
//! refer to each other by [`NodeId`]; parent links are plain indices, so no
//! ownership cycles exist.

mod combat;

pub use combat::{
    CombatAnalysis, CombatMeta, CombatTrees, OverviewRow, PlayerGraph, SharedTree,
};

use std::sync::atomic::{AtomicU64, Ordering};

use oscr_types::SortOrder;

use crate::cell::CellValue;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one analysis tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Role of a node in the two-level aggregate layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Root,
    /// Aggregate of all players
    Player,
    /// Aggregate of all enemies
    Npc,
    Row,
}

#[derive(Debug, Clone)]
pub struct AnalysisNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    row: usize,
    tag: NodeTag,
    cells: Vec<CellValue>,
}

impl AnalysisNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Position among the parent's children.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn tag(&self) -> NodeTag {
        self.tag
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

/// Arena holding every node of one analysis table.
#[derive(Debug, Clone)]
pub struct AnalysisTree {
    id: TreeId,
    width: usize,
    nodes: Vec<AnalysisNode>,
}

impl AnalysisTree {
    /// Create a tree containing only the implicit root.
    pub fn new(width: usize) -> Self {
        Self {
            id: TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            nodes: vec![AnalysisNode {
                parent: None,
                children: Vec::new(),
                row: 0,
                tag: NodeTag::Root,
                cells: Vec::new(),
            }],
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Number of columns shared by every node.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> Option<&AnalysisNode> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Append a child to `parent`. Cells beyond the tree width are dropped.
    /// Returns `None` when `parent` does not belong to this tree.
    pub fn push_child(
        &mut self,
        parent: NodeId,
        tag: NodeTag,
        mut cells: Vec<CellValue>,
    ) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        cells.truncate(self.width);
        let id = NodeId(self.nodes.len());
        let row = self.nodes[parent.0].children.len();
        self.nodes.push(AnalysisNode {
            parent: Some(parent),
            children: Vec::new(),
            row,
            tag,
            cells,
        });
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn child(&self, parent: NodeId, row: usize) -> Option<NodeId> {
        self.children(parent).get(row).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Raw value of a cell; `Absent` when the node has no data there.
    pub fn cell(&self, id: NodeId, column: usize) -> &CellValue {
        const ABSENT: &CellValue = &CellValue::Absent;
        self.node(id)
            .and_then(|n| n.cells.get(column))
            .unwrap_or(ABSENT)
    }

    /// The Player and NPC aggregates, resolved by the tag of the first root
    /// child. Returns `(player, npc)`.
    pub fn groups(&self) -> (Option<NodeId>, Option<NodeId>) {
        let children = self.children(NodeId::ROOT);
        let first = children.first().copied();
        let second = children.get(1).copied();
        match first.and_then(|id| self.node(id)).map(|n| n.tag) {
            Some(NodeTag::Npc) => (second, first),
            Some(_) => (first, second),
            None => (None, None),
        }
    }

    /// Stable-sort the children of every node below `start` (inclusive) by
    /// `column`. Children never change parent and node ids stay valid.
    pub fn sort_below(&mut self, start: NodeId, column: usize, order: SortOrder) {
        if !self.contains(start) {
            return;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let mut children = std::mem::take(&mut self.nodes[id.0].children);
            if children.len() > 1 {
                children.sort_by(|a, b| {
                    let ord = self.cell(*a, column).sort_cmp(self.cell(*b, column));
                    if order.is_descending() { ord.reverse() } else { ord }
                });
            }
            for (row, child) in children.iter().enumerate() {
                self.nodes[child.0].row = row;
                if !self.nodes[child.0].children.is_empty() {
                    stack.push(*child);
                }
            }
            self.nodes[id.0].children = children;
        }
    }

    /// Node ids in display order (pre-order), excluding the root.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        let mut stack: Vec<NodeId> = self.children(NodeId::ROOT).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }
}
