//! Sorting and filtering view over a [`TableModel`].
//!
//! The comparator is inverted: requesting [`SortOrder::Ascending`] puts the
//! highest values first. Display toolkits default to ascending on the first
//! click of a header, and rank 1 is the best performer.

use std::cmp::Ordering;

use oscr_types::SortOrder;
use tracing::debug;

use super::table::{TableModel, TableRow};
use crate::cell::CellValue;

#[derive(Debug, Clone)]
pub struct SortFilterProxy {
    source: TableModel,
    sort: Option<(usize, SortOrder)>,
    /// Lowercased filter text; empty accepts every row.
    filter: String,
    /// Proxy row -> source row.
    mapping: Vec<usize>,
}

impl SortFilterProxy {
    pub fn new(source: TableModel) -> Self {
        let mut proxy = Self {
            source,
            sort: None,
            filter: String::new(),
            mapping: Vec::new(),
        };
        proxy.invalidate();
        proxy
    }

    pub fn source(&self) -> &TableModel {
        &self.source
    }

    /// Replace the source rows, keeping sort and filter.
    pub fn set_source_rows(&mut self, rows: Vec<TableRow>) {
        self.source.set_data(rows);
        self.invalidate();
    }

    /// Append rows to the source, keeping sort and filter.
    pub fn extend_source(&mut self, rows: impl IntoIterator<Item = TableRow>) {
        self.source.extend(rows);
        self.invalidate();
    }

    pub fn set_european(&mut self, european: bool) {
        self.source.set_european(european);
    }

    /// `true` when `a` should be placed before `b` for an ascending request,
    /// which is the case when `a` is greater.
    pub fn less_than(a: &CellValue, b: &CellValue) -> bool {
        a.sort_cmp(b) == Ordering::Greater
    }

    pub fn sort(&mut self, column: usize, order: SortOrder) {
        self.sort = Some((column, order));
        self.invalidate();
        debug!(column, ?order, rows = self.mapping.len(), "Sorted table");
    }

    pub fn sort_state(&self) -> Option<(usize, SortOrder)> {
        self.sort
    }

    /// Case-insensitive substring filter over the first two columns.
    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_lowercase();
        self.invalidate();
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn accepts_row(&self, source_row: usize) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        let text = |column| {
            self.source
                .value_at(source_row, column)
                .map(CellValue::to_string)
                .unwrap_or_default()
        };
        format!("{}{}", text(0), text(1))
            .to_lowercase()
            .contains(&self.filter)
    }

    fn invalidate(&mut self) {
        let mut mapping: Vec<usize> = (0..self.source.row_count())
            .filter(|r| self.accepts_row(*r))
            .collect();
        if let Some((column, order)) = self.sort {
            let absent = CellValue::Absent;
            let source = &self.source;
            mapping.sort_by(|a, b| {
                let va = source.value_at(*a, column).unwrap_or(&absent);
                let vb = source.value_at(*b, column).unwrap_or(&absent);
                let ord = if Self::less_than(va, vb) {
                    Ordering::Less
                } else if Self::less_than(vb, va) {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                };
                if order.is_descending() { ord.reverse() } else { ord }
            });
        }
        self.mapping = mapping;
    }

    pub fn row_count(&self) -> usize {
        self.mapping.len()
    }

    pub fn column_count(&self) -> usize {
        self.source.column_count()
    }

    pub fn map_to_source(&self, row: usize) -> Option<usize> {
        self.mapping.get(row).copied()
    }

    pub fn value_at(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.source.value_at(self.map_to_source(row)?, column)
    }

    pub fn display_value(&self, row: usize, column: usize) -> String {
        self.map_to_source(row)
            .map(|r| self.source.display_value(r, column))
            .unwrap_or_default()
    }

    pub fn header_label(&self, column: usize) -> Option<&'static str> {
        self.source.header_label(column)
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.source.row_label(self.map_to_source(row)?)
    }

    pub fn row_key(&self, row: usize) -> Option<&str> {
        self.source.row_key(self.map_to_source(row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::LadderColumn;

    fn make_proxy(rows: &[(&str, &str, f64)]) -> SortFilterProxy {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (name, handle, dps))| {
                let cells: Vec<CellValue> = vec![(*name).into(), (*handle).into(), (*dps).into()];
                TableRow::new((i + 1).to_string(), cells).with_key(format!("id{}", i))
            })
            .collect();
        SortFilterProxy::new(TableModel::with_rows(LadderColumn::SPECS, rows))
    }

    fn names(proxy: &SortFilterProxy) -> Vec<String> {
        (0..proxy.row_count())
            .map(|r| proxy.display_value(r, 0))
            .collect()
    }

    #[test]
    fn test_ascending_puts_highest_first() {
        let mut proxy = make_proxy(&[("B", "@b", 5.0), ("A", "@a", 10.0)]);
        proxy.sort(2, SortOrder::Ascending);
        assert_eq!(names(&proxy), vec!["A", "B"]);
        proxy.sort(2, SortOrder::Descending);
        assert_eq!(names(&proxy), vec!["B", "A"]);
    }

    #[test]
    fn test_less_than_inverted() {
        assert!(SortFilterProxy::less_than(&10.0.into(), &5.0.into()));
        assert!(!SortFilterProxy::less_than(&5.0.into(), &10.0.into()));
        assert!(!SortFilterProxy::less_than(&5.0.into(), &5.0.into()));
    }

    #[test]
    fn test_filter_substring_case_insensitive() {
        let mut proxy = make_proxy(&[("Asdf", "Handle1", 1.0), ("Qwer", "Handle2", 2.0)]);
        proxy.set_filter("asd");
        assert_eq!(names(&proxy), vec!["Asdf"]);
        proxy.set_filter("ASD");
        assert_eq!(names(&proxy), vec!["Asdf"]);
        proxy.set_filter("");
        assert_eq!(names(&proxy), vec!["Asdf", "Qwer"]);
    }

    #[test]
    fn test_filter_spans_name_and_handle() {
        let mut proxy = make_proxy(&[("Asdf", "Handle1", 1.0), ("Qwer", "Handle2", 2.0)]);
        proxy.set_filter("rhandle");
        assert_eq!(names(&proxy), vec!["Qwer"]);
        proxy.set_filter("zzz");
        assert_eq!(proxy.row_count(), 0);
        assert_eq!(proxy.display_value(0, 0), "");
    }

    #[test]
    fn test_filter_and_sort_compose() {
        let mut proxy = make_proxy(&[
            ("Kira", "@a", 1.0),
            ("Tev", "@b", 3.0),
            ("Kirk", "@c", 2.0),
        ]);
        proxy.sort(2, SortOrder::Ascending);
        proxy.set_filter("kir");
        assert_eq!(names(&proxy), vec!["Kirk", "Kira"]);
        proxy.set_filter("");
        assert_eq!(names(&proxy), vec!["Tev", "Kirk", "Kira"]);
    }

    #[test]
    fn test_mapping_to_source() {
        let mut proxy = make_proxy(&[("B", "@b", 5.0), ("A", "@a", 10.0)]);
        proxy.sort(2, SortOrder::Ascending);
        assert_eq!(proxy.map_to_source(0), Some(1));
        assert_eq!(proxy.row_key(0), Some("id1"));
        assert_eq!(proxy.row_label(0), Some("2"));
        assert_eq!(proxy.map_to_source(5), None);
    }

    #[test]
    fn test_extend_source_resorts() {
        let mut proxy = make_proxy(&[("B", "@b", 5.0)]);
        proxy.sort(2, SortOrder::Ascending);
        proxy.extend_source(vec![TableRow::new("2", vec!["C".into(), "@c".into(), 50.0.into()])]);
        assert_eq!(names(&proxy), vec!["C", "B"]);
    }

    #[test]
    fn test_absent_sorts_last_for_ascending_request() {
        let rows = vec![
            TableRow::new("1", vec!["x".into(), "".into(), CellValue::Absent]),
            TableRow::new("2", vec!["y".into(), "".into(), 1.0.into()]),
        ];
        let mut proxy = SortFilterProxy::new(TableModel::with_rows(LadderColumn::SPECS, rows));
        proxy.sort(2, SortOrder::Ascending);
        assert_eq!(names(&proxy), vec!["y", "x"]);
    }
}
