//! Row selection policy for the analysis trees.
//!
//! Clicking the name column selects the whole row, any other column selects
//! a single cell. An empty or invalid request clears everything.

use std::collections::BTreeSet;

use super::tree::{ModelIndex, TreeModel};

/// How a selection request combines with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Replace,
    Extend,
}

#[derive(Debug, Default, Clone)]
pub struct SelectionModel {
    selected: BTreeSet<ModelIndex>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a selection event coming from the display surface.
    pub fn select(&mut self, model: &TreeModel, indices: &[ModelIndex], mode: SelectionMode) {
        if indices.is_empty() || indices.iter().any(|i| !model.is_valid(i)) {
            self.clear();
            return;
        }
        if mode == SelectionMode::Replace {
            self.selected.clear();
        }
        for index in indices {
            if index.column() == 0 {
                self.selected
                    .extend((0..model.column_count()).map(|c| index.sibling(c)));
            } else {
                self.selected.insert(*index);
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, index: &ModelIndex) -> bool {
        self.selected.contains(index)
    }

    pub fn indices(&self) -> impl Iterator<Item = &ModelIndex> {
        self.selected.iter()
    }

    /// Drop indices that no longer belong to the model's tree.
    pub fn retain_valid(&mut self, model: &TreeModel) {
        self.selected.retain(|i| model.is_valid(i));
    }
}

/// Render the selected cells as a clipboard line.
///
/// Rows appear in display order and are named by their column-0 value.
/// When every row contributes the same single column the header is written
/// once up front; otherwise each value carries its own header.
pub fn copy_selection_as_text(model: &TreeModel, selection: &SelectionModel) -> String {
    let rows: Vec<(ModelIndex, Vec<usize>)> = model
        .preorder()
        .into_iter()
        .filter_map(|node| {
            let columns: Vec<usize> = (1..model.column_count())
                .filter(|c| selection.contains(&node.sibling(*c)))
                .collect();
            (!columns.is_empty()).then_some((node, columns))
        })
        .collect();
    let Some((_, first)) = rows.first() else {
        return String::new();
    };

    let header = |c: usize| model.header(c).unwrap_or_default();
    let cell = |node: &ModelIndex, c: usize| model.display_value(&node.sibling(c));

    if first.len() == 1 && rows.iter().all(|(_, cols)| cols == first) {
        let column = first[0];
        let parts: Vec<String> = rows
            .iter()
            .map(|(node, _)| format!("`{}`: {}", model.display_value(node), cell(node, column)))
            .collect();
        return format!("{{ OSCR }} {}: {}", header(column), parts.join(" | "));
    }

    let parts: Vec<String> = rows
        .iter()
        .map(|(node, columns)| {
            let cells: Vec<String> = columns
                .iter()
                .map(|c| format!("{}: {}", header(*c), cell(node, *c)))
                .collect();
            format!("`{}`: {}", model.display_value(node), cells.join(", "))
        })
        .collect();
    format!("{{ OSCR }} {}", parts.join(" | "))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::analysis::{AnalysisTree, NodeId, NodeTag};
    use crate::cell::CellValue;
    use crate::columns::TreeVariant;

    fn make_model() -> TreeModel {
        let mut tree = AnalysisTree::new(TreeVariant::Damage.column_count());
        let player = tree
            .push_child(NodeId::ROOT, NodeTag::Player, vec!["Player".into(), 150.0.into()])
            .unwrap();
        tree.push_child(NodeId::ROOT, NodeTag::Npc, vec!["NPC".into(), 10.0.into()]);
        tree.push_child(
            player,
            NodeTag::Row,
            vec![CellValue::name("Kira", "@kira"), 100.0.into(), 2000.0.into()],
        );
        tree.push_child(
            player,
            NodeTag::Row,
            vec![CellValue::name("Tev", "@tev"), 50.0.into(), 1000.0.into()],
        );
        TreeModel::with_data(TreeVariant::Damage, Rc::new(RefCell::new(tree)))
    }

    fn player_row(model: &TreeModel, row: usize, column: usize) -> ModelIndex {
        let player = model.player_index().unwrap();
        model.index(row, column, Some(&player)).unwrap()
    }

    #[test]
    fn test_name_column_selects_whole_row() {
        let model = make_model();
        let mut selection = SelectionModel::new();
        let kira = player_row(&model, 0, 0);
        selection.select(&model, &[kira], SelectionMode::Replace);
        assert_eq!(selection.len(), model.column_count());
        for c in 0..model.column_count() {
            assert!(selection.contains(&kira.sibling(c)));
        }
    }

    #[test]
    fn test_other_column_selects_single_cell() {
        let model = make_model();
        let mut selection = SelectionModel::new();
        let cell = player_row(&model, 0, 2);
        selection.select(&model, &[cell], SelectionMode::Replace);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&cell));
    }

    #[test]
    fn test_empty_request_clears() {
        let model = make_model();
        let mut selection = SelectionModel::new();
        selection.select(&model, &[player_row(&model, 0, 1)], SelectionMode::Replace);
        selection.select(&model, &[], SelectionMode::Extend);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_invalid_index_clears() {
        let model = make_model();
        let other = make_model();
        let mut selection = SelectionModel::new();
        selection.select(&model, &[player_row(&model, 0, 1)], SelectionMode::Replace);
        selection.select(
            &model,
            &[player_row(&model, 1, 1), player_row(&other, 0, 1)],
            SelectionMode::Extend,
        );
        assert!(selection.is_empty());
    }

    #[test]
    fn test_extend_and_replace() {
        let model = make_model();
        let mut selection = SelectionModel::new();
        selection.select(&model, &[player_row(&model, 0, 1)], SelectionMode::Replace);
        selection.select(&model, &[player_row(&model, 1, 1)], SelectionMode::Extend);
        assert_eq!(selection.len(), 2);
        selection.select(&model, &[player_row(&model, 1, 2)], SelectionMode::Replace);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_retain_valid_after_data_change() {
        let mut model = make_model();
        let mut selection = SelectionModel::new();
        selection.select(&model, &[player_row(&model, 0, 1)], SelectionMode::Replace);
        let fresh = make_model();
        model.set_data(Rc::clone(fresh.shared_tree().unwrap()));
        selection.retain_valid(&model);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_copy_single_column() {
        let model = make_model();
        let mut selection = SelectionModel::new();
        selection.select(
            &model,
            &[player_row(&model, 0, 1), player_row(&model, 1, 1)],
            SelectionMode::Replace,
        );
        assert_eq!(
            copy_selection_as_text(&model, &selection),
            "{ OSCR } DPS: `Kira@kira`: 100.00 | `Tev@tev`: 50.00"
        );
    }

    #[test]
    fn test_copy_mixed_columns() {
        let model = make_model();
        let mut selection = SelectionModel::new();
        selection.select(
            &model,
            &[
                player_row(&model, 0, 1),
                player_row(&model, 0, 2),
                player_row(&model, 1, 2),
            ],
            SelectionMode::Replace,
        );
        assert_eq!(
            copy_selection_as_text(&model, &selection),
            "{ OSCR } `Kira@kira`: DPS: 100.00, Total Damage: 2,000.00 \
             | `Tev@tev`: Total Damage: 1,000.00"
        );
    }

    #[test]
    fn test_copy_follows_display_order() {
        let mut model = make_model();
        let mut selection = SelectionModel::new();
        selection.select(
            &model,
            &[player_row(&model, 0, 1), player_row(&model, 1, 1)],
            SelectionMode::Replace,
        );
        model.sort(1, oscr_types::SortOrder::Ascending);
        assert_eq!(
            copy_selection_as_text(&model, &selection),
            "{ OSCR } DPS: `Tev@tev`: 50.00 | `Kira@kira`: 100.00"
        );
    }

    #[test]
    fn test_copy_empty_selection() {
        let model = make_model();
        assert_eq!(copy_selection_as_text(&model, &SelectionModel::new()), "");
    }
}
