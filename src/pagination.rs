use serde::Serialize;
use tracing::debug;

use crate::cell::Row;
use crate::domain::{Result, TableError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub page: usize,
    pub rows_per_page: usize,
    pub rows_per_page_options: Vec<usize>,
}

impl PaginationState {
    pub fn new(rows_per_page: usize, rows_per_page_options: Vec<usize>) -> Result<Self> {
        if rows_per_page == 0 {
            return Err(TableError::InvalidRowsPerPage);
        }
        Ok(Self {
            page: 0,
            rows_per_page,
            rows_per_page_options,
        })
    }

    pub fn page_count(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.rows_per_page)
    }

    /// Largest page index that still shows at least one row.
    fn last_page(&self, total_rows: usize) -> usize {
        self.page_count(total_rows).saturating_sub(1)
    }

    /// Pulls `page` back onto the last page after the row count shrank.
    pub fn clamp(&mut self, total_rows: usize) {
        let last = self.last_page(total_rows);
        if self.page > last {
            debug!("Clamping page {} to {}", self.page, last);
            self.page = last;
        }
    }

    pub fn change_rows_per_page(&mut self, rows_per_page: usize, total_rows: usize) -> Result<()> {
        if rows_per_page == 0 {
            return Err(TableError::InvalidRowsPerPage);
        }
        self.rows_per_page = rows_per_page;
        self.clamp(total_rows);
        Ok(())
    }

    /// Moves to `page`. Out-of-range pages are reported and leave the state
    /// untouched.
    pub fn change_page(&mut self, page: usize, total_rows: usize) -> Result<()> {
        if total_rows > 0 && page.saturating_mul(self.rows_per_page) >= total_rows {
            return Err(TableError::PageOutOfRange {
                page,
                page_count: self.page_count(total_rows),
            });
        }
        self.page = page;
        Ok(())
    }

    pub fn slice<'a>(&self, rows: &'a [Row]) -> &'a [Row] {
        let begin = self.page.saturating_mul(self.rows_per_page);
        if begin >= rows.len() {
            return &[];
        }
        let end = std::cmp::min(begin + self.rows_per_page, rows.len());
        &rows[begin..end]
    }
}
