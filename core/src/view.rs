//! Display-thread facade over the analysis models of one log file.
//!
//! Holds every combat received so far, the four tree panes, the overview
//! table and the column visibility state.

use oscr_types::formatting::format_grouped;
use oscr_types::{Settings, SortOrder, TableFamily};
use tracing::{debug, warn};

use crate::analysis::{CombatAnalysis, CombatMeta, CombatTrees, OverviewRow, SharedTree};
use crate::cell::CellValue;
use crate::columns::{OverviewColumn, TreeVariant};
use crate::model::{
    ColumnVisibility, ColumnVisibilityTarget, ModelIndex, OverviewGraphs, SelectionMode,
    SelectionModel, SortFilterProxy, TableModel, TableRow, TreeModel, copy_selection_as_text,
};

/// The four analysis tables of a combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    DamageOut,
    DamageIn,
    HealOut,
    HealIn,
}

impl TreeKind {
    pub const ALL: [TreeKind; 4] = [
        TreeKind::DamageOut,
        TreeKind::DamageIn,
        TreeKind::HealOut,
        TreeKind::HealIn,
    ];

    pub fn variant(self) -> TreeVariant {
        match self {
            TreeKind::DamageOut | TreeKind::DamageIn => TreeVariant::Damage,
            TreeKind::HealOut | TreeKind::HealIn => TreeVariant::Heal,
        }
    }

    pub fn family(self) -> TableFamily {
        match self.variant() {
            TreeVariant::Damage => TableFamily::Damage,
            TreeVariant::Heal => TableFamily::Heal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TreeKind::DamageOut => "Outgoing Damage",
            TreeKind::DamageIn => "Incoming Damage",
            TreeKind::HealOut => "Outgoing Heals",
            TreeKind::HealIn => "Incoming Heals",
        }
    }

    fn tree(self, trees: &CombatTrees) -> &SharedTree {
        match self {
            TreeKind::DamageOut => &trees.damage_out,
            TreeKind::DamageIn => &trees.damage_in,
            TreeKind::HealOut => &trees.heal_out,
            TreeKind::HealIn => &trees.heal_in,
        }
    }
}

/// A tree adapter and its selection.
#[derive(Debug)]
pub struct TreePane {
    pub model: TreeModel,
    pub selection: SelectionModel,
}

impl TreePane {
    fn new(variant: TreeVariant) -> Self {
        Self {
            model: TreeModel::new(variant),
            selection: SelectionModel::new(),
        }
    }
}

/// One line of the combat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatListEntry {
    pub id: usize,
    pub map: String,
    pub date: String,
    pub time: String,
    pub difficulty: Option<String>,
}

#[derive(Debug)]
struct StoredCombat {
    meta: CombatMeta,
    overview: Vec<OverviewRow>,
    trees: CombatTrees,
}

#[derive(Debug)]
pub struct AnalysisView {
    settings: Settings,
    visibility: ColumnVisibility,
    combats: Vec<StoredCombat>,
    current: Option<usize>,
    panes: [TreePane; 4],
    overview: SortFilterProxy,
}

impl AnalysisView {
    pub fn new(settings: Settings) -> Self {
        let mut view = Self {
            visibility: ColumnVisibility::from_settings(&settings),
            settings,
            combats: Vec::new(),
            current: None,
            panes: TreeKind::ALL.map(|k| TreePane::new(k.variant())),
            overview: SortFilterProxy::new(TableModel::new(OverviewColumn::SPECS)),
        };
        view.apply_locale();
        view
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Take a new settings snapshot and re-apply everything derived from it.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.apply_locale();
        let snapshot = self.settings.clone();
        self.apply_column_visibility(&snapshot);
    }

    fn apply_locale(&mut self) {
        let european = self.settings.european_number_format;
        for pane in &mut self.panes {
            pane.model.set_european(european);
        }
        self.overview.set_european(european);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Combat list
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a finished combat. Returns its position in the combat list.
    pub fn insert_combat(&mut self, analysis: CombatAnalysis) -> usize {
        let (meta, overview, trees) = analysis.into_shared();
        debug!(id = meta.id, map = %meta.map, "Combat added to list");
        self.combats.push(StoredCombat {
            meta,
            overview,
            trees,
        });
        self.combats.len() - 1
    }

    pub fn combat_list(&self) -> Vec<CombatListEntry> {
        self.combats
            .iter()
            .map(|c| CombatListEntry {
                id: c.meta.id,
                map: c.meta.map.clone(),
                date: c.meta.date(),
                time: c.meta.time(),
                difficulty: c.meta.difficulty.clone(),
            })
            .collect()
    }

    pub fn combat_count(&self) -> usize {
        self.combats.len()
    }

    /// Drop every combat and empty all tables.
    pub fn clear(&mut self) {
        self.combats.clear();
        self.current = None;
        for pane in &mut self.panes {
            pane.model.clear();
            pane.selection.clear();
        }
        self.overview.set_source_rows(Vec::new());
    }

    pub fn current_position(&self) -> Option<usize> {
        self.current
    }

    pub fn current_combat(&self) -> Option<&CombatMeta> {
        self.current.map(|i| &self.combats[i].meta)
    }

    /// Display the combat at `position` of the combat list.
    pub fn show_combat(&mut self, position: usize) -> bool {
        let Some(combat) = self.combats.get(position) else {
            warn!(position, "No combat at list position");
            return false;
        };
        for (pane, kind) in self.panes.iter_mut().zip(TreeKind::ALL) {
            pane.model.set_data(SharedTree::clone(kind.tree(&combat.trees)));
            pane.selection.clear();
            pane.model.sort(1, SortOrder::Descending);
        }

        let rows = combat
            .overview
            .iter()
            .map(|r| TableRow::new(r.label(), r.cells.clone()))
            .collect();
        self.overview.set_source_rows(rows);
        // The proxy's comparator is inverted, so a persisted descending order
        // is requested as ascending.
        self.overview.sort(
            self.settings.overview_sort_column,
            self.settings.overview_sort_order.reversed(),
        );

        self.current = Some(position);
        let snapshot = self.settings.clone();
        self.apply_column_visibility(&snapshot);
        debug!(position, id = self.combats[position].meta.id, "Showing combat");
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tables
    // ─────────────────────────────────────────────────────────────────────────

    pub fn pane(&self, kind: TreeKind) -> &TreePane {
        &self.panes[kind as usize]
    }

    pub fn pane_mut(&mut self, kind: TreeKind) -> &mut TreePane {
        &mut self.panes[kind as usize]
    }

    pub fn overview(&self) -> &SortFilterProxy {
        &self.overview
    }

    pub fn overview_mut(&mut self) -> &mut SortFilterProxy {
        &mut self.overview
    }

    /// Graph series of the shown combat, players in overview source order.
    pub fn overview_graphs(&self) -> Option<OverviewGraphs> {
        let combat = &self.combats[self.current?];
        Some(OverviewGraphs::from_rows(&combat.overview))
    }

    pub fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    /// Re-read visibility flags and apply them to both trees of each family.
    pub fn apply_column_visibility(&mut self, settings: &Settings) {
        self.visibility = ColumnVisibility::from_settings(settings);
        let [damage_out, damage_in, heal_out, heal_in] = &mut self.panes;
        self.visibility.apply(
            TableFamily::Damage,
            &mut [&mut damage_out.model, &mut damage_in.model],
        );
        self.visibility
            .apply(TableFamily::Heal, &mut [&mut heal_out.model, &mut heal_in.model]);
    }

    /// Visible columns of a pane, in display order.
    pub fn visible_columns(&self, kind: TreeKind) -> Vec<usize> {
        let model = &self.pane(kind).model;
        (0..model.column_count())
            .filter(|c| !model.is_column_hidden(*c))
            .collect()
    }

    pub fn sort_tree(&mut self, kind: TreeKind, column: usize, order: SortOrder) {
        self.pane_mut(kind).model.sort(column, order);
    }

    pub fn select(&mut self, kind: TreeKind, indices: &[ModelIndex], mode: SelectionMode) {
        let pane = self.pane_mut(kind);
        pane.selection.select(&pane.model, indices, mode);
    }

    pub fn copy_selection(&self, kind: TreeKind) -> String {
        let pane = self.pane(kind);
        copy_selection_as_text(&pane.model, &pane.selection)
    }

    /// One-line summary of the shown combat: map, difficulty and every
    /// player's DPS, best first.
    pub fn combat_summary(&self) -> Option<String> {
        let combat = &self.combats[self.current?];
        let dps = |row: &OverviewRow| {
            row.cells
                .get(OverviewColumn::Dps.index())
                .and_then(CellValue::as_number)
                .unwrap_or(0.0)
        };
        let mut players: Vec<&OverviewRow> = combat.overview.iter().collect();
        players.sort_by(|a, b| dps(*b).total_cmp(&dps(*a)));

        let mut parts = vec![
            "OSCR".to_string(),
            combat.meta.map.clone(),
            combat
                .meta
                .difficulty
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            "DPS".to_string(),
        ];
        parts.extend(
            players
                .iter()
                .map(|p| format!("{} {}", p.handle, format_grouped(dps(*p), 0, false))),
        );
        Some(parts.join(" | "))
    }
}
