use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single table cell.
///
/// Cells are compared and hashed by value so they can be used as filter set
/// members. Numbers compare by their canonical bit pattern: `-0.0` equals `0.0`
/// and every NaN equals every other NaN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

pub type Row = Vec<Cell>;
pub type Dataset = Vec<Row>;

impl Cell {
    /// Numeric view of the cell, if it has one. Text is parsed leniently
    /// (surrounding whitespace is ignored). Only finite values count, so
    /// "NaN" and "inf" stay text.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn canonical_bits(n: f64) -> u64 {
        if n.is_nan() {
            f64::NAN.to_bits()
        } else if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }

    pub fn sort_key(&self) -> SortKey {
        match self.as_number() {
            // Fold -0.0 into 0.0
            Some(n) => SortKey::Number(n + 0.0),
            None => SortKey::Text(self.to_string()),
        }
    }

    /// Ordering used by the sort engine, see [`SortKey`].
    pub fn compare(&self, other: &Cell) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Sort key of a cell. Numbers (cells that parse as finite numbers) order
/// numerically and before all text; text orders by code point. Mixing both
/// in one column is still a total order.
#[derive(Debug, Clone)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => {
                Cell::canonical_bits(*a) == Cell::canonical_bits(*b)
            }
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Null => {}
            Cell::Bool(b) => b.hash(state),
            Cell::Number(n) => Cell::canonical_bits(*n).hash(state),
            Cell::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

/// Builds a row of text cells. Mostly useful for tests and small fixtures.
pub fn text_row<S: AsRef<str>>(values: &[S]) -> Row {
    values.iter().map(|v| Cell::from(v.as_ref())).collect()
}
