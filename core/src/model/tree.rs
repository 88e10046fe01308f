//! Tree adapter exposing one analysis tree to a row/column display surface.

use oscr_types::SortOrder;
use tracing::{debug, warn};

use super::visibility::ColumnVisibilityTarget;
use crate::analysis::{AnalysisTree, NodeId, SharedTree, TreeId};
use crate::cell::CellValue;
use crate::columns::TreeVariant;

/// Position of a cell in an adapter's index space.
///
/// Indices are tied to the tree they were produced from; once the adapter
/// shows another tree they are rejected as invalid. Sorting keeps them
/// valid because nodes are addressed by identity, not by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelIndex {
    tree: TreeId,
    node: NodeId,
    column: usize,
}

impl ModelIndex {
    pub fn tree(&self) -> TreeId {
        self.tree
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Same node, other column. Validity is checked by the adapter.
    pub fn sibling(&self, column: usize) -> ModelIndex {
        ModelIndex { column, ..*self }
    }
}

#[derive(Debug)]
pub struct TreeModel {
    variant: TreeVariant,
    tree: Option<SharedTree>,
    player: Option<NodeId>,
    npc: Option<NodeId>,
    hidden: Vec<bool>,
    european: bool,
}

impl TreeModel {
    pub fn new(variant: TreeVariant) -> Self {
        Self {
            variant,
            tree: None,
            player: None,
            npc: None,
            hidden: vec![false; variant.column_count()],
            european: false,
        }
    }

    pub fn with_data(variant: TreeVariant, tree: SharedTree) -> Self {
        let mut model = Self::new(variant);
        model.set_data(tree);
        model
    }

    /// Show another tree. Indices of the previous tree become invalid.
    pub fn set_data(&mut self, tree: SharedTree) {
        let groups = match tree.try_borrow() {
            Ok(t) => {
                if t.width() != self.variant.column_count() {
                    warn!(
                        width = t.width(),
                        expected = self.variant.column_count(),
                        "Tree width does not match column set"
                    );
                }
                t.groups()
            }
            Err(_) => {
                warn!("Tree is mutably borrowed, showing it without group lookup");
                (None, None)
            }
        };
        (self.player, self.npc) = groups;
        self.tree = Some(tree);
    }

    pub fn clear(&mut self) {
        self.tree = None;
        self.player = None;
        self.npc = None;
    }

    pub fn variant(&self) -> TreeVariant {
        self.variant
    }

    pub fn shared_tree(&self) -> Option<&SharedTree> {
        self.tree.as_ref()
    }

    pub fn set_european(&mut self, european: bool) {
        self.european = european;
    }

    /// Run `f` against the current tree, if any and not mutably borrowed.
    fn with_tree<R>(&self, f: impl FnOnce(&AnalysisTree) -> R) -> Option<R> {
        let tree = self.tree.as_ref()?.try_borrow().ok()?;
        Some(f(&tree))
    }

    fn owns(&self, tree: &AnalysisTree, index: &ModelIndex) -> bool {
        index.tree == tree.id() && tree.contains(index.node) && index.column < self.column_count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Index of child `row` of `parent` (`None` = the implicit root).
    pub fn index(
        &self,
        row: usize,
        column: usize,
        parent: Option<&ModelIndex>,
    ) -> Option<ModelIndex> {
        if column >= self.column_count() {
            return None;
        }
        self.with_tree(|tree| {
            let parent_node = match parent {
                None => NodeId::ROOT,
                Some(p) if self.owns(tree, p) => p.node,
                Some(_) => return None,
            };
            let node = tree.child(parent_node, row)?;
            Some(ModelIndex {
                tree: tree.id(),
                node,
                column,
            })
        })
        .flatten()
    }

    /// Parent index in column 0, `None` for top-level rows and invalid input.
    pub fn parent(&self, index: &ModelIndex) -> Option<ModelIndex> {
        self.with_tree(|tree| {
            if !self.owns(tree, index) {
                return None;
            }
            let parent = tree.parent(index.node)?;
            (parent != NodeId::ROOT).then(|| ModelIndex {
                tree: tree.id(),
                node: parent,
                column: 0,
            })
        })
        .flatten()
    }

    /// Position of the indexed node among its siblings.
    pub fn row(&self, index: &ModelIndex) -> Option<usize> {
        self.with_tree(|tree| {
            self.owns(tree, index)
                .then(|| tree.node(index.node).map(|n| n.row()))
                .flatten()
        })
        .flatten()
    }

    /// Number of children below `parent`; 0 for leaves and invalid indices.
    pub fn row_count(&self, parent: Option<&ModelIndex>) -> usize {
        self.with_tree(|tree| match parent {
            None => tree.children(NodeId::ROOT).len(),
            Some(p) if self.owns(tree, p) => tree.children(p.node).len(),
            Some(_) => 0,
        })
        .unwrap_or(0)
    }

    pub fn has_children(&self, parent: Option<&ModelIndex>) -> bool {
        self.row_count(parent) > 0
    }

    /// Width shared by every node, the implicit root included.
    pub fn column_count(&self) -> usize {
        self.variant.column_count()
    }

    pub fn is_valid(&self, index: &ModelIndex) -> bool {
        self.with_tree(|tree| self.owns(tree, index)).unwrap_or(false)
    }

    pub fn player_index(&self) -> Option<ModelIndex> {
        self.group_index(self.player)
    }

    pub fn npc_index(&self) -> Option<ModelIndex> {
        self.group_index(self.npc)
    }

    fn group_index(&self, node: Option<NodeId>) -> Option<ModelIndex> {
        let node = node?;
        self.with_tree(|tree| ModelIndex {
            tree: tree.id(),
            node,
            column: 0,
        })
    }

    /// Every node in display order, addressed in column 0.
    pub fn preorder(&self) -> Vec<ModelIndex> {
        self.with_tree(|tree| {
            tree.preorder()
                .into_iter()
                .map(|node| ModelIndex {
                    tree: tree.id(),
                    node,
                    column: 0,
                })
                .collect()
        })
        .unwrap_or_default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Values
    // ─────────────────────────────────────────────────────────────────────────

    /// Raw value; `Absent` for invalid indices and missing trailing cells.
    pub fn value_at(&self, index: &ModelIndex) -> CellValue {
        self.with_tree(|tree| {
            if self.owns(tree, index) {
                tree.cell(index.node, index.column).clone()
            } else {
                CellValue::Absent
            }
        })
        .unwrap_or(CellValue::Absent)
    }

    /// Value passed through its column's format rule.
    pub fn display_value(&self, index: &ModelIndex) -> String {
        let Some(spec) = self.variant.specs().get(index.column) else {
            return String::new();
        };
        spec.rule.apply(&self.value_at(index), self.european)
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        self.variant.specs().get(column).map(|s| s.header)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting
    // ─────────────────────────────────────────────────────────────────────────

    /// Sort the Player and NPC subtrees independently. The two aggregate
    /// rows keep their place under the root.
    pub fn sort(&mut self, column: usize, order: SortOrder) {
        if column >= self.column_count() {
            warn!(column, "Sort column out of range");
            return;
        }
        let Some(shared) = &self.tree else {
            return;
        };
        let Ok(mut tree) = shared.try_borrow_mut() else {
            warn!(column, "Tree is borrowed elsewhere, sort skipped");
            return;
        };
        for group in [self.player, self.npc].into_iter().flatten() {
            tree.sort_below(group, column, order);
        }
        debug!(column, ?order, variant = ?self.variant, "Sorted analysis tree");
    }

    /// Sort everything below one node.
    pub fn sort_subtree(&mut self, index: &ModelIndex, column: usize, order: SortOrder) {
        if column >= self.column_count() || !self.is_valid(index) {
            debug!(column, "Ignoring subtree sort on invalid index");
            return;
        }
        let Some(shared) = &self.tree else {
            return;
        };
        let Ok(mut tree) = shared.try_borrow_mut() else {
            warn!(column, "Tree is borrowed elsewhere, sort skipped");
            return;
        };
        tree.sort_below(index.node, column, order);
        debug!(column, ?order, "Sorted analysis subtree");
    }
}

impl ColumnVisibilityTarget for TreeModel {
    fn column_count(&self) -> usize {
        self.variant.column_count()
    }

    fn set_column_hidden(&mut self, column: usize, hidden: bool) {
        // The name column anchors the hierarchy and always stays visible.
        if column == 0 {
            return;
        }
        if let Some(flag) = self.hidden.get_mut(column) {
            *flag = hidden;
        }
    }

    fn is_column_hidden(&self, column: usize) -> bool {
        self.hidden.get(column).copied().unwrap_or(false)
    }
}
