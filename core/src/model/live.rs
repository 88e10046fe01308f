//! Live parser table and rolling graph buffers.
//!
//! The table is replaced wholesale on each tick. The rolling buffers keep the
//! last [`ROLLING_CAPACITY`] values of one field for the first
//! [`MAX_GRAPH_SERIES`] rows and feed the real-time plot.

use std::collections::VecDeque;

use oscr_types::LiveGraphField;
use oscr_types::formatting::{format_count, format_magnitude, format_seconds};

use super::visibility::ColumnVisibilityTarget;
use crate::cell::CellValue;
use crate::columns::{LIVE_COLUMN_COUNT, LiveColumn};

/// Samples kept per graph series.
pub const ROLLING_CAPACITY: usize = 15;
/// Number of rows plotted by the live graph.
pub const MAX_GRAPH_SERIES: usize = 5;

/// One entity's values on a live tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRow {
    pub label: String,
    pub values: [f64; LIVE_COLUMN_COUNT],
}

impl LiveRow {
    pub fn new(label: impl Into<String>, values: [f64; LIVE_COLUMN_COUNT]) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    pub fn value(&self, column: LiveColumn) -> f64 {
        self.values[column.index()]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Table
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct LiveTableModel {
    rows: Vec<LiveRow>,
    hidden: [bool; LIVE_COLUMN_COUNT],
    legend: bool,
    european: bool,
}

impl LiveTableModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a complete snapshot. Labels and values travel together, so
    /// `row_count` always matches the stored rows.
    pub fn replace(&mut self, rows: Vec<LiveRow>) {
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn set_legend(&mut self, legend: bool) {
        self.legend = legend;
    }

    pub fn set_european(&mut self, european: bool) {
        self.european = european;
    }

    pub fn rows(&self) -> &[LiveRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        LIVE_COLUMN_COUNT
    }

    pub fn value_at(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row)?.values.get(column).copied()
    }

    pub fn display_value(&self, row: usize, column: usize) -> String {
        let (Some(value), Some(col)) = (self.value_at(row, column), LiveColumn::ALL.get(column))
        else {
            return String::new();
        };
        col.rule().apply(&CellValue::Number(value), self.european)
    }

    pub fn header_label(&self, column: usize) -> Option<&'static str> {
        LiveColumn::ALL.get(column).map(|c| c.header())
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(|r| r.label.as_str())
    }

    /// Graph series drawn for this row, shown as a colored legend marker.
    pub fn legend_slot(&self, row: usize) -> Option<usize> {
        (self.legend && row < MAX_GRAPH_SERIES && row < self.rows.len()).then_some(row)
    }

    /// Clipboard line: DPS and combat time per entity, optionally with kills.
    pub fn copy_text(&self, with_kills: bool) -> String {
        let parts: Vec<String> = self
            .rows
            .iter()
            .map(|r| {
                let dps = format_magnitude(r.value(LiveColumn::Dps), 2, self.european);
                let time = format_seconds(r.value(LiveColumn::CombatTime), self.european);
                if with_kills {
                    let kills = format_count(r.value(LiveColumn::Kills), self.european);
                    format!("`{}`: {} ({}, {} kills)", r.label, dps, time, kills)
                } else {
                    format!("`{}`: {} ({})", r.label, dps, time)
                }
            })
            .collect();
        format!("{{ OSCR }} DPS (Combat time): {}", parts.join(" | "))
    }
}

impl ColumnVisibilityTarget for LiveTableModel {
    fn column_count(&self) -> usize {
        LIVE_COLUMN_COUNT
    }

    fn set_column_hidden(&mut self, column: usize, hidden: bool) {
        if let Some(flag) = self.hidden.get_mut(column) {
            *flag = hidden;
        }
    }

    fn is_column_hidden(&self, column: usize) -> bool {
        self.hidden.get(column).copied().unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rolling buffers
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-length sample history per graph series, prefilled with zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingBuffers {
    series: Vec<VecDeque<f64>>,
}

impl Default for RollingBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingBuffers {
    pub fn new() -> Self {
        Self {
            series: (0..MAX_GRAPH_SERIES)
                .map(|_| VecDeque::from(vec![0.0; ROLLING_CAPACITY]))
                .collect(),
        }
    }

    /// Evict the oldest sample of `entity` and append `value`.
    /// Returns `false` for entities beyond the tracked series.
    pub fn push_sample(&mut self, entity: usize, value: f64) -> bool {
        let Some(buffer) = self.series.get_mut(entity) else {
            return false;
        };
        buffer.pop_front();
        buffer.push_back(value);
        true
    }

    pub fn series(&self, entity: usize) -> Option<&VecDeque<f64>> {
        self.series.get(entity)
    }

    pub fn samples(&self, entity: usize) -> Vec<f64> {
        self.series(entity)
            .map(|b| b.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Plot x positions, oldest sample first: `-14..=0`.
    pub fn time_axis() -> [i32; ROLLING_CAPACITY] {
        std::array::from_fn(|i| i as i32 - (ROLLING_CAPACITY as i32 - 1))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Live view
// ─────────────────────────────────────────────────────────────────────────────

/// Display-thread state of the live parser window.
#[derive(Debug, Default)]
pub struct LiveView {
    table: LiveTableModel,
    graph: Option<(LiveGraphField, RollingBuffers)>,
}

impl LiveView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &LiveTableModel {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut LiveTableModel {
        &mut self.table
    }

    pub fn graph(&self) -> Option<(LiveGraphField, &RollingBuffers)> {
        self.graph.as_ref().map(|(f, b)| (*f, b))
    }

    /// Apply one tick: push one sample per plotted row, then replace the
    /// table. A changed graph field restarts the buffers.
    pub fn apply_tick(&mut self, rows: Vec<LiveRow>, graph_field: Option<LiveGraphField>) {
        match graph_field {
            Some(field) => {
                if !matches!(&self.graph, Some((current, _)) if *current == field) {
                    self.graph = Some((field, RollingBuffers::new()));
                }
                if let Some((_, buffers)) = &mut self.graph {
                    for (i, row) in rows.iter().take(MAX_GRAPH_SERIES).enumerate() {
                        buffers.push_sample(i, row.values[field.live_column()]);
                    }
                }
            }
            None => self.graph = None,
        }
        self.table.set_legend(self.graph.is_some());
        // A tick without entities keeps the last snapshot on screen.
        if !rows.is_empty() {
            self.table.replace(rows);
        }
    }

    pub fn clear(&mut self) {
        self.table.clear();
        if let Some((_, buffers)) = &mut self.graph {
            buffers.reset();
        }
    }
}
