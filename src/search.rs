use std::time::Instant;

use rayon::prelude::*;
use tracing::trace;

use crate::cell::Row;
use crate::columns::Column;

/// Normalized search term, or `None` when the text places no restriction.
pub fn search_term(search_text: Option<&str>) -> Option<String> {
    search_text
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase)
}

fn row_matches(row: &Row, columns: &[Column], term: &str) -> bool {
    // Hidden columns are not part of the search surface; missing cells never match
    columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.display)
        .filter_map(|(idx, _)| row.get(idx))
        .any(|cell| cell.to_string().to_lowercase().contains(term))
}

/// Rows with at least one visible cell containing `search_text`,
/// case-insensitively. Input order is kept.
pub fn apply(rows: Vec<Row>, columns: &[Column], search_text: Option<&str>) -> Vec<Row> {
    let Some(term) = search_term(search_text) else {
        return rows;
    };

    let start_time = Instant::now();
    let total = rows.len();
    let matches: Vec<Row> = rows
        .into_par_iter()
        .filter(|row| row_matches(row, columns, &term))
        .collect();
    trace!(
        "Search for {:?} matched {}/{} rows in {}ms",
        term,
        matches.len(),
        total,
        start_time.elapsed().as_millis()
    );
    matches
}
