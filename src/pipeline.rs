use std::time::Instant;

use tracing::debug;

use crate::cell::Row;
use crate::columns::Column;
use crate::filter::{self, FilterList};
use crate::search;
use crate::sort::{self, SortSpec};

/// Derives the display data: filter, then search, then sort, over the whole
/// dataset. Pagination is applied later, at render time, so totals reflect the
/// filtered set.
pub fn recompute(
    data: &[Row],
    columns: &[Column],
    filter_list: &FilterList,
    search_text: Option<&str>,
    sort_spec: &SortSpec,
) -> Vec<Row> {
    let start_time = Instant::now();

    let rows = filter::apply(data.to_vec(), filter_list);
    let filtered = rows.len();
    let rows = search::apply(rows, columns, search_text);
    let searched = rows.len();
    let rows = sort::apply(rows, sort_spec);

    debug!(
        "Recomputed display data: {} rows, {} after filter, {} after search in {}ms",
        data.len(),
        filtered,
        searched,
        start_time.elapsed().as_millis()
    );
    rows
}
