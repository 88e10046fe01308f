//! Row-major table adapter for the overview and ladder displays.

use crate::cell::CellValue;
use crate::columns::ColumnSpec;

/// One table row: vertical header label, cells and an optional opaque key.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<CellValue>,
    /// Never displayed; e.g. the combat log id of a ladder entry.
    pub key: Option<String>,
}

impl TableRow {
    pub fn new(label: impl Into<String>, cells: Vec<CellValue>) -> Self {
        Self {
            label: label.into(),
            cells,
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TableModel {
    specs: &'static [ColumnSpec],
    rows: Vec<TableRow>,
    european: bool,
}

impl TableModel {
    pub fn new(specs: &'static [ColumnSpec]) -> Self {
        Self {
            specs,
            rows: Vec::new(),
            european: false,
        }
    }

    pub fn with_rows(specs: &'static [ColumnSpec], rows: Vec<TableRow>) -> Self {
        Self {
            specs,
            rows,
            european: false,
        }
    }

    /// Replace every row (fresh query).
    pub fn set_data(&mut self, rows: Vec<TableRow>) {
        self.rows = rows;
    }

    /// Append rows without disturbing existing row numbers.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = TableRow>) {
        self.rows.extend(rows);
    }

    pub fn set_european(&mut self, european: bool) {
        self.european = european;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row, 0 when empty.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.cells.len())
    }

    pub fn value_at(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row)?.cells.get(column)
    }

    /// Formatted cell; empty for out-of-range positions.
    pub fn display_value(&self, row: usize, column: usize) -> String {
        let Some(value) = self.value_at(row, column) else {
            return String::new();
        };
        match self.specs.get(column) {
            Some(spec) => spec.rule.apply(value, self.european),
            None => value.to_string(),
        }
    }

    pub fn header_label(&self, column: usize) -> Option<&'static str> {
        self.specs.get(column).map(|s| s.header)
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(|r| r.label.as_str())
    }

    pub fn row_key(&self, row: usize) -> Option<&str> {
        self.rows.get(row)?.key.as_deref()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{LadderColumn, OverviewColumn};

    fn make_ladder_row(rank: usize, name: &str, dps: f64) -> TableRow {
        TableRow::new(
            rank.to_string(),
            vec![name.into(), "@h".into(), dps.into()],
        )
        .with_key(format!("log-{rank}"))
    }

    #[test]
    fn test_empty_table() {
        let table = TableModel::new(OverviewColumn::SPECS);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.value_at(0, 0).is_none());
        assert_eq!(table.display_value(3, 3), "");
    }

    #[test]
    fn test_values_and_labels() {
        let table = TableModel::with_rows(
            LadderColumn::SPECS,
            vec![make_ladder_row(1, "Kira", 125_000.5)],
        );
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.display_value(0, 2), "125,000.50");
        assert_eq!(table.header_label(2), Some("DPS"));
        assert_eq!(table.row_label(0), Some("1"));
        assert_eq!(table.row_key(0), Some("log-1"));
        assert_eq!(table.row_key(1), None);
    }

    #[test]
    fn test_extend_keeps_existing_rows() {
        let mut table = TableModel::new(LadderColumn::SPECS);
        table.set_data(vec![make_ladder_row(1, "a", 3.0), make_ladder_row(2, "b", 2.0)]);
        table.extend(vec![make_ladder_row(3, "c", 1.0)]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.row_label(0), Some("1"));
        assert_eq!(table.row_label(2), Some("3"));

        table.set_data(vec![]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_columns_without_spec_render_plain() {
        let table = TableModel::with_rows(
            LadderColumn::SPECS,
            vec![TableRow::new("1", vec![CellValue::Absent; 12])],
        );
        assert_eq!(table.column_count(), 12);
        assert_eq!(table.display_value(0, 11), "");
        assert_eq!(table.header_label(11), None);
    }
}
