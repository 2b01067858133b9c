use tracing::trace;

use tvpipe::{Cell, FilterType, Message, TableError, TableModel};

use crate::Args;

/// Maps command line view controls to table messages, in the order a user
/// would click through them.
pub struct Controller {
    filters: Vec<String>,
    search: Option<String>,
    sort: Vec<String>,
    hide: Vec<String>,
    rows_per_page: Option<usize>,
    page: Option<usize>,
}

impl Controller {
    pub fn new(args: &Args) -> Self {
        Self {
            filters: args.filter.clone(),
            search: args.search.clone(),
            sort: args.sort.clone(),
            hide: args.hide.clone(),
            rows_per_page: args.rows_per_page,
            page: args.page,
        }
    }

    pub fn messages(&self, model: &TableModel) -> Result<Vec<Message>, TableError> {
        let mut messages = Vec::new();

        for column in self.hide.iter() {
            messages.push(Message::ToggleColumnDisplay(resolve_column(model, column)?));
        }
        for filter in self.filters.iter() {
            let (column, value) = filter.split_once('=').ok_or_else(|| {
                TableError::InvalidInput(format!("Filter {filter:?} is not COLUMN=VALUE"))
            })?;
            let column = resolve_column(model, column)?;
            messages.push(Message::FilterUpdate {
                column,
                value: Some(filter_value(model, column, value)),
                filter_type: FilterType::Checkbox,
            });
        }
        if let Some(text) = &self.search {
            messages.push(Message::SearchTextUpdate(Some(text.clone())));
        }
        for column in self.sort.iter() {
            messages.push(Message::SortUpdate(resolve_column(model, column)?));
        }
        if let Some(n) = self.rows_per_page {
            messages.push(Message::ChangeRowsPerPage(n));
        }
        if let Some(page) = self.page {
            messages.push(Message::ChangePage(page));
        }

        for message in messages.iter() {
            trace!("Mapped: {message:?}");
        }
        Ok(messages)
    }
}

/// Columns are given by name or by index.
fn resolve_column(model: &TableModel, column: &str) -> Result<usize, TableError> {
    model
        .column_index(column)
        .or_else(|| column.parse::<usize>().ok())
        .ok_or_else(|| TableError::InvalidInput(format!("Unknown column {column:?}")))
}

/// Picks the filter candidate whose text matches `value`, so numeric and
/// boolean cells can be filtered from the command line.
fn filter_value(model: &TableModel, column: usize, value: &str) -> Cell {
    model
        .filter_data()
        .get(column)
        .and_then(|values| values.iter().find(|v| v.to_string() == value))
        .cloned()
        .unwrap_or_else(|| Cell::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tvpipe::{ColumnDecl, TableOptions, text_row};

    fn model() -> TableModel {
        let columns = ["Name", "Age"].map(ColumnDecl::from).to_vec();
        let data = vec![
            vec![Cell::from("Joe"), Cell::Number(41.0)],
            vec![Cell::from("Bob"), Cell::Number(7.0)],
            text_row(&["Ann", "n/a"]),
        ];
        TableModel::new(columns, data, TableOptions::default()).unwrap()
    }

    #[test]
    fn maps_arguments_in_click_order() {
        let args = Args::parse_from([
            "tvpipe", "data.csv", "--hide", "1", "--filter", "Age=41", "--search", "jo",
            "--sort", "Name", "--sort", "Name", "--page", "0",
        ]);
        let messages = Controller::new(&args).messages(&model()).unwrap();
        assert_eq!(
            messages,
            vec![
                Message::ToggleColumnDisplay(1),
                Message::FilterUpdate {
                    column: 1,
                    value: Some(Cell::Number(41.0)),
                    filter_type: FilterType::Checkbox,
                },
                Message::SearchTextUpdate(Some("jo".into())),
                Message::SortUpdate(0),
                Message::SortUpdate(0),
                Message::ChangePage(0),
            ]
        );
    }

    #[test]
    fn rejects_unknown_columns_and_bad_filters() {
        let args = Args::parse_from(["tvpipe", "data.csv", "--sort", "Nope"]);
        assert!(Controller::new(&args).messages(&model()).is_err());

        let args = Args::parse_from(["tvpipe", "data.csv", "--filter", "Name"]);
        assert!(matches!(
            Controller::new(&args).messages(&model()),
            Err(TableError::InvalidInput(_))
        ));
    }

    #[test]
    fn unmatched_filter_values_stay_text() {
        let model = model();
        assert_eq!(filter_value(&model, 1, "n/a"), Cell::from("n/a"));
        assert_eq!(filter_value(&model, 1, "99"), Cell::from("99"));
    }
}
