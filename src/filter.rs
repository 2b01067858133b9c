use std::collections::HashSet;

use tracing::{debug, trace};

use crate::cell::{Cell, Row};
use crate::domain::FilterType;

/// Active filter selection, one entry per column. An empty entry places no
/// restriction on its column.
pub type FilterList = Vec<Vec<Cell>>;

pub fn empty_filter_list(column_count: usize) -> FilterList {
    vec![Vec::new(); column_count]
}

/// Applies one filter popover event to the selection.
///
/// Checkbox and multiselect toggle `value`; select replaces the selection,
/// and a `None` value clears it. Stale column indices are ignored.
pub fn update(
    filter_list: &mut FilterList,
    column: usize,
    value: Option<Cell>,
    filter_type: FilterType,
) {
    let Some(selection) = filter_list.get_mut(column) else {
        debug!("Ignoring filter update for unknown column {column}");
        return;
    };

    match (filter_type, value) {
        (FilterType::Checkbox | FilterType::Multiselect, Some(value)) => {
            if let Some(pos) = selection.iter().position(|v| *v == value) {
                selection.remove(pos);
            } else {
                selection.push(value);
            }
        }
        (FilterType::Checkbox | FilterType::Multiselect, None) => {}
        (FilterType::Select, Some(value)) => *selection = vec![value],
        (FilterType::Select, None) => selection.clear(),
    }
    trace!("Filter for column {column}: {:?}", filter_list[column]);
}

pub fn reset(filter_list: &mut FilterList) {
    filter_list.iter_mut().for_each(Vec::clear);
}

/// Rows passing every non-empty column filter, in input order.
pub fn apply(rows: Vec<Row>, filter_list: &FilterList) -> Vec<Row> {
    let active: Vec<(usize, HashSet<&Cell>)> = filter_list
        .iter()
        .enumerate()
        .filter(|(_, selection)| !selection.is_empty())
        .map(|(idx, selection)| (idx, selection.iter().collect()))
        .collect();

    if active.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            active
                .iter()
                .all(|(idx, selection)| row.get(*idx).is_some_and(|c| selection.contains(c)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::text_row;

    fn sample() -> Vec<Row> {
        vec![
            text_row(&["Joe James", "Test Corp", "Yonkers", "NY"]),
            text_row(&["John Walsh", "Test Corp", "Hartford", "CT"]),
            text_row(&["Bob Herm", "Other Inc", "Tampa", "FL"]),
        ]
    }

    #[test]
    fn checkbox_toggles() {
        let mut list = empty_filter_list(4);
        update(&mut list, 0, Some("Joe James".into()), FilterType::Checkbox);
        assert_eq!(list, vec![text_row(&["Joe James"]), vec![], vec![], vec![]]);

        update(&mut list, 0, Some("Joe James".into()), FilterType::Multiselect);
        assert_eq!(list, empty_filter_list(4));
    }

    #[test]
    fn select_replaces_and_clears() {
        let mut list = empty_filter_list(2);
        update(&mut list, 1, Some("a".into()), FilterType::Checkbox);
        update(&mut list, 1, Some("b".into()), FilterType::Checkbox);
        update(&mut list, 1, Some("c".into()), FilterType::Select);
        assert_eq!(list[1], text_row(&["c"]));

        update(&mut list, 1, None, FilterType::Select);
        assert!(list[1].is_empty());
    }

    #[test]
    fn out_of_range_column_is_ignored() {
        let mut list = empty_filter_list(2);
        update(&mut list, 7, Some("a".into()), FilterType::Checkbox);
        assert_eq!(list, empty_filter_list(2));
    }

    #[test]
    fn reset_keeps_length() {
        let mut list = empty_filter_list(3);
        update(&mut list, 2, Some("a".into()), FilterType::Select);
        reset(&mut list);
        assert_eq!(list, empty_filter_list(3));
    }

    #[test]
    fn and_across_columns_or_within() {
        let mut list = empty_filter_list(4);
        update(&mut list, 0, Some("Joe James".into()), FilterType::Checkbox);
        update(&mut list, 0, Some("Bob Herm".into()), FilterType::Checkbox);
        let rows = apply(sample(), &list);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Cell::from("Joe James"));
        assert_eq!(rows[1][0], Cell::from("Bob Herm"));

        update(&mut list, 1, Some("Test Corp".into()), FilterType::Checkbox);
        let rows = apply(sample(), &list);
        assert_eq!(rows, vec![sample()[0].clone()]);
    }

    #[test]
    fn missing_cells_never_match() {
        let mut list = empty_filter_list(2);
        update(&mut list, 1, Some(Cell::Null), FilterType::Select);
        let rows = vec![text_row(&["a"]), vec![Cell::from("b"), Cell::Null]];
        assert_eq!(apply(rows, &list), vec![vec![Cell::from("b"), Cell::Null]]);
    }
}
