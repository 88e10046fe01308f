//! Tests for the tree adapter
//!
//! Covers navigation, stale-index rejection and the structure-preserving
//! recursive sort.

use std::cell::RefCell;
use std::rc::Rc;

use oscr_types::SortOrder;

use super::tree::{ModelIndex, TreeModel};
use super::visibility::ColumnVisibilityTarget;
use crate::analysis::{AnalysisTree, NodeId, NodeTag, SharedTree};
use crate::cell::CellValue;
use crate::columns::{DamageColumn, TreeVariant};

fn share(tree: AnalysisTree) -> SharedTree {
    Rc::new(RefCell::new(tree))
}

/// Damage row with a name, a DPS and a total damage value.
fn make_row(name: &str, dps: f64, total: f64) -> Vec<CellValue> {
    vec![CellValue::text(name), dps.into(), total.into()]
}

/// Two players with two abilities each, and two enemies.
///
/// ```text
/// root
/// ├── Player            (150)
/// │   ├── B@b            (50)   ── Torpedo 10, Beam 40
/// │   └── A@a           (100)   ── Beam 30, Cannon 70
/// └── NPC               (300)
///     ├── Borg Cube     (100)
///     └── Sphere        (200)
/// ```
fn make_combat_tree() -> AnalysisTree {
    let width = TreeVariant::Damage.column_count();
    let mut tree = AnalysisTree::new(width);
    let player = tree
        .push_child(NodeId::ROOT, NodeTag::Player, make_row("Player", 150.0, 1500.0))
        .unwrap();
    let npc = tree
        .push_child(NodeId::ROOT, NodeTag::Npc, make_row("NPC", 300.0, 3000.0))
        .unwrap();

    let b = tree
        .push_child(
            player,
            NodeTag::Row,
            vec![CellValue::name("B", "@b"), 50.0.into(), 500.0.into()],
        )
        .unwrap();
    tree.push_child(b, NodeTag::Row, make_row("Torpedo", 10.0, 100.0));
    tree.push_child(b, NodeTag::Row, make_row("Beam", 40.0, 400.0));

    let a = tree
        .push_child(
            player,
            NodeTag::Row,
            vec![CellValue::name("A", "@a"), 100.0.into(), 1000.0.into()],
        )
        .unwrap();
    tree.push_child(a, NodeTag::Row, make_row("Beam", 30.0, 300.0));
    tree.push_child(a, NodeTag::Row, make_row("Cannon", 70.0, 700.0));

    tree.push_child(npc, NodeTag::Row, make_row("Borg Cube", 100.0, 900.0));
    tree.push_child(npc, NodeTag::Row, make_row("Sphere", 200.0, 2100.0));
    tree
}

fn make_model() -> TreeModel {
    TreeModel::with_data(TreeVariant::Damage, share(make_combat_tree()))
}

/// Display names of the children of `parent`, in row order.
fn child_names(model: &TreeModel, parent: Option<&ModelIndex>) -> Vec<String> {
    (0..model.row_count(parent))
        .filter_map(|row| model.index(row, 0, parent))
        .map(|idx| model.display_value(&idx))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Navigation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_root_has_player_and_npc() {
    let model = make_model();
    assert_eq!(model.row_count(None), 2);
    assert_eq!(child_names(&model, None), vec!["Player", "NPC"]);
    assert_eq!(model.column_count(), 22);

    let player = model.player_index().unwrap();
    let npc = model.npc_index().unwrap();
    assert_eq!(model.row(&player), Some(0));
    assert_eq!(model.row(&npc), Some(1));
}

#[test]
fn test_parent_child_round_trip() {
    let model = make_model();
    let player = model.index(0, 0, None).unwrap();
    let a = model.index(1, 3, Some(&player)).unwrap();
    assert_eq!(model.parent(&a), Some(player));
    assert_eq!(model.parent(&player), None);
    assert_eq!(model.row_count(Some(&a)), 2);
}

#[test]
fn test_build_adapter_binds_tree_with_empty_selection() {
    let (mut model, selection) =
        super::build_adapter(share(make_combat_tree()), TreeVariant::Damage);
    assert!(selection.is_empty());
    assert!(model.has_children(None));

    super::sort_column(&mut model, DamageColumn::Dps.index(), SortOrder::Ascending);
    let player = model.player_index().unwrap();
    assert_eq!(child_names(&model, Some(&player)), vec!["B@b", "A@a"]);
    let b = model.index(0, 0, Some(&player)).unwrap();
    assert!(model.has_children(Some(&b)));
    let leaf = model.index(0, 0, Some(&b)).unwrap();
    assert!(!model.has_children(Some(&leaf)));
}

#[test]
fn test_out_of_range_indices_are_invalid() {
    let model = make_model();
    assert!(model.index(2, 0, None).is_none());
    assert!(model.index(0, 22, None).is_none());

    let player = model.index(0, 0, None).unwrap();
    assert!(model.index(5, 0, Some(&player)).is_none());
}

#[test]
fn test_empty_model_is_defensive() {
    let model = TreeModel::new(TreeVariant::Heal);
    assert_eq!(model.row_count(None), 0);
    assert_eq!(model.column_count(), 14);
    assert!(model.index(0, 0, None).is_none());
    assert!(model.player_index().is_none());
    assert!(model.preorder().is_empty());
}

#[test]
fn test_stale_index_rejected_after_set_data() {
    let mut model = make_model();
    let stale = model.index(0, 1, None).unwrap();
    assert!(model.is_valid(&stale));

    model.set_data(share(make_combat_tree()));
    assert!(!model.is_valid(&stale));
    assert_eq!(model.value_at(&stale), CellValue::Absent);
    assert_eq!(model.display_value(&stale), "");
    assert_eq!(model.row_count(Some(&stale)), 0);
    assert!(model.parent(&stale).is_none());
    assert!(model.index(0, 0, Some(&stale)).is_none());
}

#[test]
fn test_index_from_other_adapter_rejected() {
    let model = make_model();
    let other = make_model();
    let foreign = other.index(0, 0, None).unwrap();
    assert!(!model.is_valid(&foreign));
}

// ─────────────────────────────────────────────────────────────────────────────
// Values & formatting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_display_values() {
    let model = make_model();
    let player = model.player_index().unwrap();
    let a = model.index(1, 0, Some(&player)).unwrap();
    assert_eq!(model.display_value(&a), "A@a");
    assert_eq!(model.display_value(&a.sibling(DamageColumn::Dps.index())), "100.00");
    assert_eq!(
        model.display_value(&a.sibling(DamageColumn::TotalDamage.index())),
        "1,000.00"
    );
    assert_eq!(model.header(DamageColumn::Dps.index()), Some("DPS"));
    assert_eq!(model.header(99), None);
}

#[test]
fn test_missing_trailing_cells_are_absent() {
    let model = make_model();
    let player = model.player_index().unwrap();
    let hull = player.sibling(DamageColumn::HullDps.index());
    assert!(model.is_valid(&hull));
    assert_eq!(model.value_at(&hull), CellValue::Absent);
    assert_eq!(model.display_value(&hull), "");
}

#[test]
fn test_european_display() {
    let mut model = make_model();
    model.set_european(true);
    let player = model.player_index().unwrap();
    assert_eq!(model.display_value(&player.sibling(2)), "1.500,00");
}

// ─────────────────────────────────────────────────────────────────────────────
// Sorting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sort_descending_two_players() {
    let mut model = make_model();
    model.sort(DamageColumn::Dps.index(), SortOrder::Descending);

    let player = model.player_index().unwrap();
    assert_eq!(child_names(&model, Some(&player)), vec!["A@a", "B@b"]);

    let a = model.index(0, 0, Some(&player)).unwrap();
    assert_eq!(child_names(&model, Some(&a)), vec!["Cannon", "Beam"]);
    let b = model.index(1, 0, Some(&player)).unwrap();
    assert_eq!(child_names(&model, Some(&b)), vec!["Beam", "Torpedo"]);
}

#[test]
fn test_sort_ascending_recurses() {
    let mut model = make_model();
    model.sort(DamageColumn::Dps.index(), SortOrder::Ascending);

    let player = model.player_index().unwrap();
    assert_eq!(child_names(&model, Some(&player)), vec!["B@b", "A@a"]);
    let b = model.index(0, 0, Some(&player)).unwrap();
    assert_eq!(child_names(&model, Some(&b)), vec!["Torpedo", "Beam"]);

    let npc = model.npc_index().unwrap();
    assert_eq!(child_names(&model, Some(&npc)), vec!["Borg Cube", "Sphere"]);
}

#[test]
fn test_sort_never_reorders_root() {
    let mut model = make_model();
    // NPC aggregate has the higher DPS, it still stays second.
    model.sort(DamageColumn::Dps.index(), SortOrder::Descending);
    assert_eq!(child_names(&model, None), vec!["Player", "NPC"]);
}

#[test]
fn test_sort_preserves_structure_and_identity() {
    let mut model = make_model();
    let player = model.player_index().unwrap();
    let a = model.index(1, 0, Some(&player)).unwrap();
    let cannon = model.index(1, 0, Some(&a)).unwrap();

    model.sort(DamageColumn::Dps.index(), SortOrder::Descending);

    // Indices survive the sort and still point to the same nodes.
    assert!(model.is_valid(&a));
    assert_eq!(model.display_value(&a), "A@a");
    assert_eq!(model.row(&a), Some(0));
    assert_eq!(model.parent(&cannon), Some(a));
    assert_eq!(model.row(&cannon), Some(0));

    let mut names = child_names(&model, Some(&player));
    names.sort();
    assert_eq!(names, vec!["A@a", "B@b"]);
}

#[test]
fn test_sort_is_idempotent() {
    let mut model = make_model();
    model.sort(2, SortOrder::Descending);
    let first: Vec<String> = model.preorder().iter().map(|i| model.display_value(i)).collect();
    model.sort(2, SortOrder::Descending);
    let second: Vec<String> = model.preorder().iter().map(|i| model.display_value(i)).collect();
    assert_eq!(first, second);
}

#[test]
fn test_sort_is_stable_for_ties() {
    let width = TreeVariant::Damage.column_count();
    let mut tree = AnalysisTree::new(width);
    let player = tree
        .push_child(NodeId::ROOT, NodeTag::Player, make_row("Player", 0.0, 0.0))
        .unwrap();
    tree.push_child(NodeId::ROOT, NodeTag::Npc, make_row("NPC", 0.0, 0.0));
    for name in ["first", "second", "third"] {
        tree.push_child(player, NodeTag::Row, make_row(name, 5.0, 5.0));
    }
    let mut model = TreeModel::with_data(TreeVariant::Damage, share(tree));
    model.sort(1, SortOrder::Descending);
    let player = model.player_index().unwrap();
    assert_eq!(child_names(&model, Some(&player)), vec!["first", "second", "third"]);
}

#[test]
fn test_absent_values_sort_lowest() {
    let width = TreeVariant::Damage.column_count();
    let mut tree = AnalysisTree::new(width);
    let player = tree
        .push_child(NodeId::ROOT, NodeTag::Player, make_row("Player", 0.0, 0.0))
        .unwrap();
    tree.push_child(NodeId::ROOT, NodeTag::Npc, make_row("NPC", 0.0, 0.0));
    tree.push_child(player, NodeTag::Row, make_row("high", 9.0, 1.0));
    tree.push_child(player, NodeTag::Row, vec![CellValue::text("missing")]);
    tree.push_child(player, NodeTag::Row, make_row("low", 1.0, 1.0));

    let mut model = TreeModel::with_data(TreeVariant::Damage, share(tree));
    let player = model.player_index().unwrap();

    model.sort(1, SortOrder::Ascending);
    assert_eq!(child_names(&model, Some(&player)), vec!["missing", "low", "high"]);

    model.sort(1, SortOrder::Descending);
    assert_eq!(child_names(&model, Some(&player)), vec!["high", "low", "missing"]);
}

#[test]
fn test_npc_order_kept_when_presorted() {
    let mut model = make_model();
    let npc = model.npc_index().unwrap();
    model.sort_subtree(&npc, 1, SortOrder::Descending);
    let before = child_names(&model, Some(&npc));
    assert_eq!(before, vec!["Sphere", "Borg Cube"]);

    model.sort(1, SortOrder::Descending);
    assert_eq!(child_names(&model, Some(&npc)), before);
    let player = model.player_index().unwrap();
    assert_eq!(child_names(&model, Some(&player)), vec!["A@a", "B@b"]);
}

#[test]
fn test_sort_subtree_leaves_other_group() {
    let mut model = make_model();
    let player = model.player_index().unwrap();
    model.sort_subtree(&player, 1, SortOrder::Descending);
    let npc = model.npc_index().unwrap();
    assert_eq!(child_names(&model, Some(&npc)), vec!["Borg Cube", "Sphere"]);
}

#[test]
fn test_sort_out_of_range_column_is_noop() {
    let mut model = make_model();
    let before: Vec<String> = model.preorder().iter().map(|i| model.display_value(i)).collect();
    model.sort(40, SortOrder::Descending);
    let after: Vec<String> = model.preorder().iter().map(|i| model.display_value(i)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_sort_persists_in_shared_tree() {
    let tree = share(make_combat_tree());
    let mut model = TreeModel::with_data(TreeVariant::Damage, Rc::clone(&tree));
    model.sort(1, SortOrder::Descending);

    let reopened = TreeModel::with_data(TreeVariant::Damage, tree);
    let player = reopened.player_index().unwrap();
    assert_eq!(child_names(&reopened, Some(&player)), vec!["A@a", "B@b"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Column visibility
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_name_column_never_hidden() {
    let mut model = make_model();
    model.set_column_hidden(0, true);
    model.set_column_hidden(3, true);
    assert!(!model.is_column_hidden(0));
    assert!(model.is_column_hidden(3));
    model.set_column_hidden(99, true);
    assert!(!model.is_column_hidden(99));
}
