use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cell::{Cell, Dataset};
use crate::columns::ColumnDecl;
use crate::domain::{Result, TableError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileType {
    CSV,
    PARQUET,
    ARROW,
    JSON,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub file_type: FileType,
}

/// Column declarations plus rows, as read from a data file.
#[derive(Debug)]
pub struct LoadedTable {
    pub columns: Vec<ColumnDecl>,
    pub data: Dataset,
}

/// JSON data files hold either an array of arrays (with a separate column
/// list) or an array of objects keyed by column name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonData {
    Rows(Dataset),
    Records(Vec<HashMap<String, Cell>>),
}

pub fn detect_file_type(path: &Path) -> Result<FileType> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        Some("JSON") => Ok(FileType::JSON),
        _ => Err(TableError::UnknownFileType),
    }
}

pub fn get_file_info(path: PathBuf) -> Result<FileInfo> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TableError::FileNotFound,
        ErrorKind::PermissionDenied => TableError::PermissionDenied,
        _ => TableError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TableError::LoadingFailed("Not a file!".into()));
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size,
        file_type,
    })
}

/// Loads a data file. `columns` is only needed for JSON row arrays, which
/// carry no header; other formats name their own columns.
pub fn load_data_file(path: PathBuf, columns: Option<Vec<ColumnDecl>>) -> Result<LoadedTable> {
    let file_info = get_file_info(path)?;
    debug!("Loading {:?}", file_info);
    let start_time = Instant::now();

    let table = match file_info.file_type {
        FileType::CSV => load_frame(load_csv(&file_info.path)?)?,
        FileType::PARQUET => load_frame(load_parquet(&file_info.path)?)?,
        FileType::ARROW => load_frame(load_arrow(&file_info.path)?)?,
        FileType::JSON => load_json(&file_info.path, columns.clone())?,
    };

    // An explicit column list wins over file headers (display/sort overrides)
    let table = match columns {
        Some(columns) if file_info.file_type != FileType::JSON => LoadedTable {
            columns,
            data: table.data,
        },
        _ => table,
    };

    info!(
        "Loading {} rows ({} bytes) took {}ms ...",
        table.data.len(),
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    Ok(table)
}

fn load_json(path: &Path, columns: Option<Vec<ColumnDecl>>) -> Result<LoadedTable> {
    let text = fs::read_to_string(path)?;
    match serde_json::from_str::<JsonData>(&text)? {
        JsonData::Rows(data) => {
            let columns = match columns {
                Some(columns) => columns,
                // `[]` may as well be an empty record list
                None if data.is_empty() => Vec::new(),
                None => {
                    return Err(TableError::LoadingFailed(
                        "JSON row arrays need a column list".into(),
                    ));
                }
            };
            Ok(LoadedTable { columns, data })
        }
        JsonData::Records(records) => {
            let columns = match columns {
                Some(columns) => columns,
                None => record_keys(&records),
            };
            let normalized = crate::columns::normalize(&columns, Default::default())?;
            let data = crate::model::project_records(records, &normalized);
            Ok(LoadedTable { columns, data })
        }
    }
}

/// Column names of record data, in first-seen order.
fn record_keys(records: &[HashMap<String, Cell>]) -> Vec<ColumnDecl> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        let mut keys: Vec<&String> = record.keys().filter(|k| !names.contains(*k)).collect();
        // HashMap iteration order is arbitrary, keep new keys of one record stable
        keys.sort();
        names.extend(keys.into_iter().cloned());
    }
    names.into_iter().map(ColumnDecl::Name).collect()
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn load_column(df: &DataFrame, col_name: &str) -> std::result::Result<Vec<Cell>, PolarsError> {
    let col = df.column(col_name)?;
    let dtype = col.dtype().clone();

    let cells = if is_numeric_type(&dtype) {
        let col = col.cast(&DataType::Float64)?;
        col.f64()?
            .into_iter()
            .map(|v| v.map(Cell::Number).unwrap_or_default())
            .collect()
    } else if dtype == DataType::Boolean {
        col.bool()?
            .into_iter()
            .map(|v| v.map(Cell::Bool).unwrap_or_default())
            .collect()
    } else {
        let col = col.cast(&DataType::String)?;
        col.str()?
            .into_iter()
            .map(|v| v.map(Cell::from).unwrap_or_default())
            .collect()
    };
    Ok(cells)
}

/// Collects a lazy frame into rows. Each column is converted on its own
/// rayon task, then the columns are transposed into rows.
fn load_frame(frame: LazyFrame) -> Result<LoadedTable> {
    let df = frame.collect()?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    let columns: std::result::Result<Vec<Vec<Cell>>, PolarsError> = names
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let columns = columns?;

    let data = (0..df.height())
        .map(|ridx| columns.iter().map(|c| c[ridx].clone()).collect())
        .collect();

    Ok(LoadedTable {
        columns: names.into_iter().map(ColumnDecl::Name).collect(),
        data,
    })
}

fn load_csv(path: &Path) -> std::result::Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> std::result::Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> std::result::Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
