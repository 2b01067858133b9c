use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use tracing::trace;

use crate::cell::{Cell, Row};

/// Unique values of one column, in first-occurrence order.
#[derive(Debug, Clone, Default)]
struct ColumnValues {
    seen: HashSet<Cell>,
    values: Vec<Cell>,
}

impl ColumnValues {
    fn extend(&mut self, rows: &[Row], idx: usize) {
        // Missing cells (short rows) are not candidates
        for cell in rows.iter().filter_map(|row| row.get(idx)) {
            if !self.seen.contains(cell) {
                self.seen.insert(cell.clone());
                self.values.push(cell.clone());
            }
        }
    }
}

/// Per-column candidate filter values derived from a dataset.
///
/// Building is a single pass over the rows for every column; columns are
/// independent so each one is indexed on its own rayon task. Appending rows
/// continues the scan without revisiting earlier rows.
#[derive(Debug, Clone, Default)]
pub struct FilterIndex {
    columns: Vec<ColumnValues>,
}

impl FilterIndex {
    pub fn new(column_count: usize) -> Self {
        Self {
            columns: vec![ColumnValues::default(); column_count],
        }
    }

    pub fn build(rows: &[Row], column_count: usize) -> Self {
        let mut index = Self::new(column_count);
        index.extend(rows);
        index
    }

    pub fn extend(&mut self, rows: &[Row]) {
        let start_time = Instant::now();
        self.columns
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, column)| column.extend(rows, idx));
        trace!(
            "Indexed {} rows for {} columns in {}ms",
            rows.len(),
            self.columns.len(),
            start_time.elapsed().as_millis()
        );
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn values(&self, column: usize) -> Option<&[Cell]> {
        self.columns.get(column).map(|c| c.values.as_slice())
    }

    /// The filter data handed to a filter popover.
    pub fn filter_data(&self) -> Vec<Vec<Cell>> {
        self.columns.iter().map(|c| c.values.clone()).collect()
    }
}

pub fn build_filter_data(rows: &[Row], column_count: usize) -> Vec<Vec<Cell>> {
    FilterIndex::build(rows, column_count).filter_data()
}
