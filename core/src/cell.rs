//! Cell values shared by every table and tree adapter.

use std::cmp::Ordering;
use std::fmt;

/// One cell of an analysis row.
///
/// Rows produced by the analysis engine mix numbers, plain strings and
/// `(name, handle)` pairs; leaf rows may leave trailing columns empty.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Name { name: String, handle: String },
    Absent,
}

impl CellValue {
    pub fn name(name: impl Into<String>, handle: impl Into<String>) -> Self {
        CellValue::Name {
            name: name.into(),
            handle: handle.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        CellValue::Text(text.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Rank of the variant in the total order: absent < number < text.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Absent => 0,
            CellValue::Number(_) => 1,
            CellValue::Text(_) | CellValue::Name { .. } => 2,
        }
    }

    /// Total order used by every sort.
    ///
    /// Absent values are the lowest of all, numbers use `f64::total_cmp`,
    /// text and names compare by their displayed string.
    pub fn sort_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (a, b) if a.rank() == 2 && b.rank() == 2 => a.to_string().cmp(&b.to_string()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Name { name, handle } => write!(f, "{}{}", name, handle),
            CellValue::Absent => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Absent, Into::into)
    }
}
