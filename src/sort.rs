use std::cmp::Ordering;
use std::time::Instant;

use serde::Serialize;
use tracing::trace;

use crate::cell::{Row, SortKey};
use crate::domain::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SortSpec {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: usize, direction: SortDirection) -> Self {
        Self {
            column: Some(column),
            direction,
        }
    }
}

fn compare_keys(a: Option<&SortKey>, b: Option<&SortKey>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less, // Present cells come first
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by the cells of one column.
///
/// Keys are computed once per row. The direction is applied to the
/// comparator, so rows with equal keys keep their input order whether sorting
/// ascending or descending.
pub fn apply(rows: Vec<Row>, spec: &SortSpec) -> Vec<Row> {
    let Some(column) = spec.column else {
        return rows;
    };

    let start_time = Instant::now();
    let mut keyed: Vec<(Option<SortKey>, Row)> = rows
        .into_iter()
        .map(|row| (row.get(column).map(|c| c.sort_key()), row))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_keys(a.as_ref(), b.as_ref());
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    let rows: Vec<Row> = keyed.into_iter().map(|(_, row)| row).collect();
    trace!(
        "Sorted {} rows by column {} {} in {}ms",
        rows.len(),
        column,
        spec.direction.as_str(),
        start_time.elapsed().as_millis()
    );
    rows
}
