//! View pipeline for tabular data.
//!
//! A [`TableModel`] owns a dataset, its normalized columns and the view state a
//! data table widget edits: per-column filter selections, a free-text search,
//! the active sort column and the current page. Every operation changes one
//! piece of that state and recomputes the display data from scratch:
//!
//! ```text
//! data -> filter -> search -> sort -> display data -> page slice
//! ```
//!
//! ```
//! use tvpipe::{ColumnDecl, FilterType, TableModel, TableOptions, text_row};
//!
//! let columns = ["Name", "City"].map(ColumnDecl::from).to_vec();
//! let data = vec![text_row(&["Joe", "Yonkers"]), text_row(&["Bob", "Tampa"])];
//! let mut table = TableModel::new(columns, data, TableOptions::default()).unwrap();
//!
//! table.filter_update(1, Some("Tampa".into()), FilterType::Checkbox);
//! assert_eq!(table.display_data(), &[text_row(&["Bob", "Tampa"])]);
//! ```

pub mod cell;
pub mod columns;
pub mod domain;
pub mod filter;
pub mod filter_index;
pub mod loader;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod search;
pub mod sort;

pub use cell::{Cell, Dataset, Row, SortKey, text_row};
pub use columns::{Column, ColumnDecl};
pub use domain::{FilterType, Message, Result, SortDirection, TableError, TableOptions};
pub use filter::FilterList;
pub use filter_index::{FilterIndex, build_filter_data};
pub use model::{TableModel, ViewState, project_records};
pub use pagination::PaginationState;
pub use sort::SortSpec;
