use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use tvpipe::loader::load_data_file;
use tvpipe::{ColumnDecl, Row, TableError, TableModel, TableOptions};

mod controller;

use controller::Controller;

/// Filter, search, sort and page through a data file.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Data file (csv, parquet, arrow/ipc/feather or json)
    pub path: String,

    /// JSON file with table options
    #[arg(long)]
    pub options: Option<String>,

    /// JSON file with column declarations (names or descriptors)
    #[arg(long)]
    pub columns: Option<String>,

    /// Toggle a filter value, COLUMN=VALUE (repeatable)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Free-text search over visible columns
    #[arg(long)]
    pub search: Option<String>,

    /// Click a column header to sort (repeat to flip the direction)
    #[arg(long)]
    pub sort: Vec<String>,

    /// Hide a column (repeatable)
    #[arg(long)]
    pub hide: Vec<String>,

    /// Page to show, starting at 0
    #[arg(long)]
    pub page: Option<usize>,

    #[arg(long)]
    pub rows_per_page: Option<usize>,

    /// Print all matching rows
    #[arg(long)]
    pub no_pagination: bool,

    /// Log filter, overrides RUST_LOG
    #[arg(long)]
    pub log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    match run(args) {
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .init();
}

fn expand(path: &str) -> Result<PathBuf, TableError> {
    let expanded = shellexpand::full(path)
        .map_err(|e| TableError::InvalidInput(format!("Cannot expand {path:?}: {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn run(args: Args) -> Result<(), TableError> {
    let mut options = match &args.options {
        Some(path) => serde_json::from_str::<TableOptions>(&fs::read_to_string(expand(path)?)?)?,
        None => TableOptions::default(),
    };
    if args.no_pagination {
        options.pagination = false;
    }
    let columns = match &args.columns {
        Some(path) => Some(serde_json::from_str::<Vec<ColumnDecl>>(
            &fs::read_to_string(expand(path)?)?,
        )?),
        None => None,
    };

    let table = load_data_file(expand(&args.path)?, columns)?;
    let mut model = TableModel::new(table.columns, table.data, options)?;

    let controller = Controller::new(&args);
    for message in controller.messages(&model)? {
        model.update(message)?;
    }
    debug!("View state: {:?}", model.view_state());

    print_page(&model, &mut io::stdout().lock(), &mut io::stderr().lock())?;
    Ok(())
}

fn format_row(row: &Row, model: &TableModel) -> String {
    model
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.display)
        .map(|(idx, _)| row.get(idx).map(|c| c.to_string()).unwrap_or_default())
        .collect::<Vec<String>>()
        .join("\t")
}

/// Writes the visible page to `out` and one status line to `status_out`.
fn print_page(model: &TableModel, out: &mut impl Write, status_out: &mut impl Write) -> io::Result<()> {
    let header = model
        .columns()
        .iter()
        .filter(|c| c.display)
        .map(|c| c.name.as_str())
        .collect::<Vec<&str>>()
        .join("\t");
    writeln!(out, "{header}")?;

    let rows = model.page_rows();
    for row in rows {
        writeln!(out, "{}", format_row(row, model))?;
    }

    let total = model.total_rows();
    let first = if rows.is_empty() {
        0
    } else if model.options().pagination {
        model.page() * model.rows_per_page() + 1
    } else {
        1
    };
    let status = if model.options().pagination {
        format!(
            "rows {}-{} of {}, page {}/{}",
            first,
            first + rows.len().saturating_sub(1),
            total,
            if total == 0 { 0 } else { model.page() + 1 },
            model.page_count()
        )
    } else {
        format!("rows {}-{} of {}", first, first + rows.len().saturating_sub(1), total)
    };
    writeln!(status_out, "{status}")
}
