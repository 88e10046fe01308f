//! Plain-text rendering of the display models.

use std::fmt::Write;

use oscr_core::model::{
    ColumnVisibilityTarget, LiveView, ModelIndex, OverviewGraphs, SortFilterProxy, TreeModel,
};
use oscr_core::view::{AnalysisView, CombatListEntry, TreeKind};

const NAME_WIDTH: usize = 32;
const CELL_WIDTH: usize = 14;
const RANKING_WIDTH: usize = 40;

fn push_cells(out: &mut String, first: &str, cells: impl Iterator<Item = String>) {
    let _ = write!(out, "{first:<NAME_WIDTH$}");
    for cell in cells {
        let _ = write!(out, "{cell:>CELL_WIDTH$}");
    }
    out.push('\n');
}

fn depth(model: &TreeModel, index: &ModelIndex) -> usize {
    let mut depth = 0;
    let mut current = model.parent(index);
    while let Some(parent) = current {
        depth += 1;
        current = model.parent(&parent);
    }
    depth
}

/// Follow a `/`-separated row path from the root, e.g. `0/2/1`.
pub fn resolve_path(model: &TreeModel, path: &str, column: usize) -> Option<ModelIndex> {
    let mut current: Option<ModelIndex> = None;
    for part in path.split('/').filter(|p| !p.is_empty()) {
        let row: usize = part.parse().ok()?;
        current = Some(model.index(row, 0, current.as_ref())?);
    }
    current.map(|index| index.sibling(column))
}

pub fn render_combat_list(entries: &[CombatListEntry], current: Option<usize>) -> String {
    if entries.is_empty() {
        return "No combats analyzed.\n".to_string();
    }
    let mut out = String::new();
    for (position, entry) in entries.iter().enumerate() {
        let marker = if current == Some(position) { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} [{position:>2}] #{:<3} {:<28} {:<10} {} {}",
            entry.id,
            entry.map,
            entry.difficulty.as_deref().unwrap_or("Unknown"),
            entry.date,
            entry.time
        );
    }
    out
}

/// Render a tree pane in display order, with row paths usable by `select`.
pub fn render_tree(view: &AnalysisView, kind: TreeKind, max_depth: Option<usize>) -> String {
    let model = &view.pane(kind).model;
    let columns = view.visible_columns(kind);
    let mut out = String::new();
    let _ = writeln!(out, "{}", kind.label());
    push_cells(
        &mut out,
        model.header(0).unwrap_or(""),
        columns
            .iter()
            .skip(1)
            .map(|c| model.header(*c).unwrap_or("").to_string()),
    );

    let mut path: Vec<usize> = Vec::new();
    for index in model.preorder() {
        let level = depth(model, &index);
        if max_depth.is_some_and(|max| level > max) {
            continue;
        }
        path.truncate(level);
        path.push(model.row(&index).unwrap_or(0));
        let selected = view.pane(kind).selection.contains(&index);
        let label = format!(
            "{}{}{} {}",
            if selected { ">" } else { " " },
            "  ".repeat(level),
            path.iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join("/"),
            model.display_value(&index)
        );
        push_cells(
            &mut out,
            &label,
            columns
                .iter()
                .skip(1)
                .map(|c| model.display_value(&index.sibling(*c))),
        );
    }
    out
}

pub fn render_overview(proxy: &SortFilterProxy) -> String {
    let mut out = String::new();
    let columns = proxy.column_count();
    push_cells(
        &mut out,
        "Player",
        (0..columns).map(|c| proxy.header_label(c).unwrap_or("").to_string()),
    );
    for row in 0..proxy.row_count() {
        push_cells(
            &mut out,
            proxy.row_label(row).unwrap_or(""),
            (0..columns).map(|c| proxy.display_value(row, c)),
        );
    }
    if let Some((column, order)) = proxy.sort_state() {
        let _ = writeln!(out, "sorted by column {column} ({order:?})");
    }
    if !proxy.filter_text().is_empty() {
        let _ = writeln!(out, "filter: {:?}", proxy.filter_text());
    }
    out
}

pub fn render_live(view: &LiveView) -> String {
    let table = view.table();
    let columns: Vec<usize> = (0..table.column_count())
        .filter(|c| !table.is_column_hidden(*c))
        .collect();
    let mut out = String::new();
    push_cells(
        &mut out,
        "Player",
        columns
            .iter()
            .map(|c| table.header_label(*c).unwrap_or("").to_string()),
    );
    for row in 0..table.row_count() {
        let label = match table.legend_slot(row) {
            Some(slot) => format!("({slot}) {}", table.row_label(row).unwrap_or("")),
            None => table.row_label(row).unwrap_or("").to_string(),
        };
        push_cells(
            &mut out,
            &label,
            columns.iter().map(|c| table.display_value(row, *c)),
        );
    }
    if let Some((field, buffers)) = view.graph() {
        let _ = writeln!(
            out,
            "{} over the last {} ticks:",
            field.label(),
            buffers.samples(0).len()
        );
        for slot in 0..table.row_count().min(oscr_core::model::MAX_GRAPH_SERIES) {
            let samples = buffers
                .samples(slot)
                .iter()
                .map(|v| format!("{v:.0}"))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(out, "  ({slot}) {samples}");
        }
    }
    out
}

fn format_pairs(pairs: &[(f64, f64)]) -> String {
    pairs
        .iter()
        .map(|(x, y)| format!("{x:.2}:{y:.0}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The three overview graphs as text: DPS lines, damage bars, DPS ranking.
pub fn render_graphs(graphs: &OverviewGraphs) -> String {
    let mut out = String::new();
    if graphs.is_empty() {
        out.push_str("No players\n");
        return out;
    }

    out.push_str("DPS over time:\n");
    for line in &graphs.dps_lines {
        let _ = writeln!(out, "  ({}) {}: {}", line.slot, line.label, format_pairs(&line.points));
    }
    let _ = writeln!(out, "Damage per interval (bar width {:.3}):", graphs.bar_width);
    for series in &graphs.damage_bars {
        let _ = writeln!(
            out,
            "  ({}) {}: {}",
            series.slot,
            series.label,
            format_pairs(&series.bars)
        );
    }
    out.push_str("DPS ranking:\n");
    for bar in &graphs.ranking {
        let filled = if graphs.ranking_max > 0.0 {
            ((bar.dps / graphs.ranking_max) * RANKING_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<NAME_WIDTH$}{:<RANKING_WIDTH$} {:.0}",
            bar.label,
            "#".repeat(filled.min(RANKING_WIDTH)),
            bar.dps
        );
    }
    out
}
