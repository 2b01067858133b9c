use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::cell::{Cell, Dataset, Row};
use crate::columns::{self, Column, ColumnDecl};
use crate::domain::{FilterType, Message, Result, TableOptions};
use crate::filter::{self, FilterList};
use crate::filter_index::FilterIndex;
use crate::pagination::PaginationState;
use crate::pipeline;
use crate::sort::SortSpec;

/// Owned view state. Only the public operations of [`TableModel`] change it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub filter_list: FilterList,
    pub search_text: Option<String>,
    pub sort_spec: SortSpec,
    pub pagination: PaginationState,
}

pub struct TableModel {
    options: TableOptions,
    column_decls: Vec<ColumnDecl>,
    columns: Vec<Column>,
    data: Dataset,
    filter_index: FilterIndex,
    filter_data: Vec<Vec<Cell>>,
    view: ViewState,
    display_data: Dataset,
}

/// Projects records keyed by column name into rows in declared column order.
/// Keys without a column are dropped, absent keys become [`Cell::Null`].
pub fn project_records(records: Vec<HashMap<String, Cell>>, columns: &[Column]) -> Dataset {
    records
        .into_iter()
        .map(|mut record| {
            columns
                .iter()
                .map(|c| record.remove(&c.name).unwrap_or_default())
                .collect()
        })
        .collect()
}

impl TableModel {
    pub fn new(decls: Vec<ColumnDecl>, data: Dataset, options: TableOptions) -> Result<Self> {
        let columns = columns::normalize(&decls, options.default_sort)?;
        let pagination = PaginationState::new(
            options.rows_per_page,
            options.rows_per_page_options.clone(),
        )?;
        let view = ViewState {
            filter_list: filter::empty_filter_list(columns.len()),
            search_text: None,
            sort_spec: SortSpec::default(),
            pagination,
        };

        let mut model = Self {
            options,
            column_decls: decls,
            columns,
            data,
            filter_index: FilterIndex::default(),
            filter_data: Vec::new(),
            view,
            display_data: Vec::new(),
        };
        model.rebuild_filter_index();
        model.recompute();
        info!(
            "Table ready: {} columns, {} rows",
            model.columns.len(),
            model.data.len()
        );
        Ok(model)
    }

    /// Like [`TableModel::new`] for records keyed by column name.
    pub fn from_records(
        decls: Vec<ColumnDecl>,
        records: Vec<HashMap<String, Cell>>,
        options: TableOptions,
    ) -> Result<Self> {
        let columns = columns::normalize(&decls, options.default_sort)?;
        let data = project_records(records, &columns);
        Self::new(decls, data, options)
    }

    pub fn update(&mut self, message: Message) -> Result<()> {
        trace!("Update: {message:?}");
        match message {
            Message::FilterUpdate {
                column,
                value,
                filter_type,
            } => self.filter_update(column, value, filter_type),
            Message::ResetFilters => self.reset_filters(),
            Message::SearchTextUpdate(text) => self.search_text_update(text),
            Message::SortUpdate(column) => self.sort_update(column),
            Message::ChangePage(page) => self.change_page(page)?,
            Message::ChangeRowsPerPage(n) => self.change_rows_per_page(n)?,
            Message::ToggleColumnDisplay(column) => self.toggle_column_display(column),
            Message::ReplaceData(data) => self.replace_data(data),
            Message::AppendRows(rows) => self.append_rows(rows),
        }
        Ok(())
    }

    // -------------------- Public operations ---------------------- //

    pub fn filter_update(&mut self, column: usize, value: Option<Cell>, filter_type: FilterType) {
        if !self.options.filter {
            debug!("Filtering is disabled, ignoring filter update");
            return;
        }
        filter::update(&mut self.view.filter_list, column, value, filter_type);
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        filter::reset(&mut self.view.filter_list);
        self.recompute();
    }

    pub fn search_text_update(&mut self, text: Option<String>) {
        if !self.options.search {
            debug!("Search is disabled, ignoring search text");
            return;
        }
        self.view.search_text = text;
        self.recompute();
    }

    /// Sorts by `column`. Clicking the active column flips the direction; a
    /// new column sorts opposite to its header annotation, so the default
    /// `desc` annotation sorts ascending on the first click.
    pub fn sort_update(&mut self, column: usize) {
        if !self.options.sort {
            debug!("Sorting is disabled, ignoring sort request");
            return;
        }
        let Some(annotation) = self.columns.get(column).map(|c| c.sort) else {
            debug!("Ignoring sort request for unknown column {column}");
            return;
        };

        let direction = match (self.view.sort_spec.column, annotation) {
            (Some(active), _) if active == column => self.view.sort_spec.direction.toggle(),
            (_, Some(current)) => current.toggle(),
            (_, None) => Default::default(),
        };
        self.view.sort_spec = SortSpec::new(column, direction);
        self.annotate_sort();
        self.recompute();
    }

    pub fn change_page(&mut self, page: usize) -> Result<()> {
        self.view.pagination.change_page(page, self.total_rows())
    }

    pub fn change_rows_per_page(&mut self, rows_per_page: usize) -> Result<()> {
        let total = self.total_rows();
        self.view
            .pagination
            .change_rows_per_page(rows_per_page, total)
    }

    pub fn toggle_column_display(&mut self, column: usize) {
        let Some(c) = self.columns.get_mut(column) else {
            debug!("Ignoring display toggle for unknown column {column}");
            return;
        };
        c.display = !c.display;
        // Visibility changes the search surface
        self.recompute();
    }

    /// Replaces the dataset. Filter data is re-derived and the filter
    /// selection starts over; search, sort and page survive.
    pub fn replace_data(&mut self, data: Dataset) {
        self.data = data;
        self.view.filter_list = filter::empty_filter_list(self.columns.len());
        self.rebuild_filter_index();
        self.recompute();
    }

    /// Replaces columns and dataset together.
    pub fn replace_columns(&mut self, decls: Vec<ColumnDecl>, data: Dataset) -> Result<()> {
        self.columns = columns::normalize(&decls, self.options.default_sort)?;
        self.column_decls = decls;
        if self
            .view
            .sort_spec
            .column
            .is_some_and(|c| c >= self.columns.len())
        {
            self.view.sort_spec = SortSpec::default();
        }
        self.annotate_sort();
        self.replace_data(data);
        Ok(())
    }

    /// Adds rows at the end of the dataset, extending the filter index
    /// without rescanning earlier rows.
    pub fn append_rows(&mut self, rows: Dataset) {
        self.filter_index.extend(&rows);
        self.filter_data = self.filter_index.filter_data();
        self.data.extend(rows);
        self.recompute();
    }

    // -------------------- Observable outputs ---------------------- //

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_decls(&self) -> &[ColumnDecl] {
        &self.column_decls
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn data(&self) -> &[Row] {
        &self.data
    }

    pub fn display_data(&self) -> &[Row] {
        &self.display_data
    }

    pub fn filter_data(&self) -> &[Vec<Cell>] {
        &self.filter_data
    }

    pub fn filter_list(&self) -> &FilterList {
        &self.view.filter_list
    }

    pub fn search_text(&self) -> Option<&str> {
        self.view.search_text.as_deref()
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.view.sort_spec
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn page(&self) -> usize {
        self.view.pagination.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.view.pagination.rows_per_page
    }

    pub fn rows_per_page_options(&self) -> &[usize] {
        &self.view.pagination.rows_per_page_options
    }

    pub fn total_rows(&self) -> usize {
        self.display_data.len()
    }

    pub fn page_count(&self) -> usize {
        self.view.pagination.page_count(self.total_rows())
    }

    /// Rows of the current page, or all display data when pagination is off.
    pub fn page_rows(&self) -> &[Row] {
        if self.options.pagination {
            self.view.pagination.slice(&self.display_data)
        } else {
            &self.display_data
        }
    }

    // -------------------- Derived state ---------------------- //

    /// Only the active sort column keeps a header annotation. Without an
    /// active column the declared annotations stand.
    fn annotate_sort(&mut self) {
        let Some(active) = self.view.sort_spec.column else {
            return;
        };
        let direction = self.view.sort_spec.direction;
        for (idx, c) in self.columns.iter_mut().enumerate() {
            c.sort = if idx == active { Some(direction) } else { None };
        }
    }

    fn rebuild_filter_index(&mut self) {
        self.filter_index = FilterIndex::build(&self.data, self.columns.len());
        self.filter_data = self.filter_index.filter_data();
    }

    fn recompute(&mut self) {
        self.display_data = pipeline::recompute(
            &self.data,
            &self.columns,
            &self.view.filter_list,
            self.view.search_text.as_deref(),
            &self.view.sort_spec,
        );
        let total = self.display_data.len();
        self.view.pagination.clamp(total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::text_row;
    use crate::domain::{SortDirection, TableError};

    fn decls() -> Vec<ColumnDecl> {
        ["First Name", "Company", "City", "State"]
            .map(ColumnDecl::from)
            .to_vec()
    }

    fn sample() -> Dataset {
        vec![
            text_row(&["Joe James", "Test Corp", "Yonkers", "NY"]),
            text_row(&["John Walsh", "Test Corp", "Hartford", "CT"]),
            text_row(&["Bob Herm", "Test Corp", "Tampa", "FL"]),
            text_row(&["James Houston", "Test Corp", "Dallas", "TX"]),
        ]
    }

    fn model() -> TableModel {
        TableModel::new(decls(), sample(), TableOptions::default()).unwrap()
    }

    #[test]
    fn sort_clicks_cycle_direction() {
        let mut table = model();
        assert_eq!(table.sort_spec().column, None);

        table.sort_update(2);
        assert_eq!(*table.sort_spec(), SortSpec::new(2, SortDirection::Asc));
        assert_eq!(table.display_data()[0][2], Cell::from("Dallas"));
        assert_eq!(table.columns()[2].sort, Some(SortDirection::Asc));
        assert_eq!(table.columns()[0].sort, None);

        table.sort_update(2);
        assert_eq!(table.sort_spec().direction, SortDirection::Desc);
        assert_eq!(table.display_data()[0][2], Cell::from("Yonkers"));

        table.sort_update(0);
        assert_eq!(*table.sort_spec(), SortSpec::new(0, SortDirection::Asc));
        assert_eq!(table.columns()[2].sort, None);
    }

    #[test]
    fn sort_out_of_range_is_ignored() {
        let mut table = model();
        table.sort_update(9);
        assert_eq!(*table.sort_spec(), SortSpec::default());
        assert_eq!(table.display_data(), sample().as_slice());
    }

    #[test]
    fn disabled_surfaces_are_inert() {
        let options = TableOptions::default()
            .filter(false)
            .search(false)
            .sort(false);
        let mut table = TableModel::new(decls(), sample(), options).unwrap();
        table.filter_update(0, Some("Joe James".into()), FilterType::Checkbox);
        table.search_text_update(Some("Tampa".into()));
        table.sort_update(0);
        assert_eq!(table.display_data(), sample().as_slice());
        assert_eq!(table.filter_list(), &filter::empty_filter_list(4));
    }

    #[test]
    fn toggling_display_changes_search_surface() {
        let mut table = model();
        table.search_text_update(Some("Tampa".into()));
        assert_eq!(table.total_rows(), 1);
        table.toggle_column_display(2);
        assert!(!table.columns()[2].display);
        assert_eq!(table.total_rows(), 0);
        table.toggle_column_display(2);
        assert_eq!(table.total_rows(), 1);
        table.toggle_column_display(42);
    }

    #[test]
    fn page_is_clamped_when_results_shrink() {
        let options = TableOptions::default().rows_per_page(1usize);
        let mut table = TableModel::new(decls(), sample(), options).unwrap();
        table.change_page(3).unwrap();
        assert_eq!(table.page_rows(), &sample()[3..4]);

        table.search_text_update(Some("jo".into()));
        assert_eq!(table.total_rows(), 2);
        assert_eq!(table.page(), 1);
        assert_eq!(table.page_rows()[0][0], Cell::from("John Walsh"));
    }

    #[test]
    fn change_page_out_of_range_keeps_state() {
        let options = TableOptions::default().rows_per_page(2usize);
        let mut table = TableModel::new(decls(), sample(), options).unwrap();
        table.change_page(1).unwrap();
        let err = table.update(Message::ChangePage(2)).unwrap_err();
        assert!(matches!(err, TableError::PageOutOfRange { page: 2, page_count: 2 }));
        assert_eq!(table.page(), 1);
    }

    #[test]
    fn pagination_off_renders_everything() {
        let options = TableOptions::default().rows_per_page(1usize).pagination(false);
        let table = TableModel::new(decls(), sample(), options).unwrap();
        assert_eq!(table.page_rows().len(), 4);
    }

    #[test]
    fn replace_data_rederives_filter_data() {
        let mut table = model();
        table.filter_update(3, Some("NY".into()), FilterType::Checkbox);
        table.search_text_update(Some("a".into()));
        table.replace_data(vec![text_row(&["Ann Lee", "Acme", "Austin", "TX"])]);

        assert_eq!(table.filter_list(), &filter::empty_filter_list(4));
        assert_eq!(table.filter_data()[1], text_row(&["Acme"]));
        assert_eq!(table.search_text(), Some("a"));
        assert_eq!(table.total_rows(), 1);
    }

    #[test]
    fn replace_columns_drops_stale_sort() {
        let mut table = model();
        table.sort_update(3);
        table
            .replace_columns(vec!["Only".into()], vec![text_row(&["x"])])
            .unwrap();
        assert_eq!(*table.sort_spec(), SortSpec::default());
        assert_eq!(table.filter_list().len(), 1);
        assert_eq!(table.column_decls().len(), 1);
    }

    #[test]
    fn replace_columns_keeps_active_sort_annotation() {
        let mut table = model();
        table.sort_update(0);
        table
            .replace_columns(
                ["Name", "Company", "Town"].map(ColumnDecl::from).to_vec(),
                vec![text_row(&["b", "x", "y"]), text_row(&["a", "x", "y"])],
            )
            .unwrap();
        assert_eq!(*table.sort_spec(), SortSpec::new(0, SortDirection::Asc));
        let annotations: Vec<_> = table.columns().iter().map(|c| c.sort).collect();
        assert_eq!(annotations, vec![Some(SortDirection::Asc), None, None]);
        assert_eq!(table.display_data()[0][0], Cell::from("a"));
    }

    #[test]
    fn append_rows_extends_filter_data() {
        let mut table = model();
        table.update(Message::AppendRows(vec![text_row(&["Ann Lee", "Acme", "Austin", "TX"])]))
            .unwrap();
        assert_eq!(table.data().len(), 5);
        assert_eq!(table.filter_data()[1], text_row(&["Test Corp", "Acme"]));
        assert_eq!(table.filter_data()[3].len(), 4);
    }

    #[test]
    fn records_are_projected_in_column_order() {
        let records = vec![HashMap::from([
            ("City".to_string(), Cell::from("Yonkers")),
            ("First Name".to_string(), Cell::from("Joe James")),
            ("Unknown".to_string(), Cell::from("dropped")),
        ])];
        let table = TableModel::from_records(decls(), records, TableOptions::default()).unwrap();
        assert_eq!(
            table.data()[0],
            vec![
                Cell::from("Joe James"),
                Cell::Null,
                Cell::from("Yonkers"),
                Cell::Null
            ]
        );
        assert_eq!(table.column_index("City"), Some(2));
    }
}
