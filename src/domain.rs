use std::io;

use derive_setters::Setters;
use polars::error::PolarsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::{Cell, Dataset};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("column declaration {index} has no name")]
    Schema { index: usize },
    #[error("page {page} is out of range ({page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
    #[error("rows per page must be greater than zero")]
    InvalidRowsPerPage,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type")]
    UnknownFileType,
}

pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// How a filter popover edits the selection of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Checkbox,
    Multiselect,
    Select,
}

/// Recognized table options. Unknown keys in an options file are ignored and
/// missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Setters, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub rows_per_page: usize,
    pub rows_per_page_options: Vec<usize>,
    pub pagination: bool,
    pub filter: bool,
    pub search: bool,
    pub sort: bool,
    /// Sort annotation given to columns that do not declare one. `Desc` means
    /// "the next click sorts ascending"; nothing is sorted at rest.
    pub default_sort: SortDirection,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            rows_per_page: 10,
            rows_per_page_options: vec![10, 15, 100],
            pagination: true,
            filter: true,
            search: true,
            sort: true,
            default_sort: SortDirection::Desc,
        }
    }
}

/// Every state change a host UI can request.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    FilterUpdate {
        column: usize,
        value: Option<Cell>,
        filter_type: FilterType,
    },
    ResetFilters,
    SearchTextUpdate(Option<String>),
    SortUpdate(usize),
    ChangePage(usize),
    ChangeRowsPerPage(usize),
    ToggleColumnDisplay(usize),
    ReplaceData(Dataset),
    AppendRows(Dataset),
}
