//! Table loading for delimited text and spreadsheets.
//!
//! The source format is chosen from the file extension. Delimited files are
//! read with the `csv` crate and decoded with the configured encoding; every
//! field becomes a text or empty [`Cell`]. Spreadsheets are read with
//! `calamine` (first sheet unless one is named) and keep their numeric and
//! date cells typed.

use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::NaiveDate;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::{CANONICAL_DATE_FORMAT, Cell, Table},
    error::CleanError,
    io_utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, CleanError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "tsv" => Ok(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(CleanError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "<none>".to_string()
                } else {
                    extension
                },
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Separator override for delimited input.
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    /// Sheet to read from a workbook; the first sheet when absent.
    pub sheet: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
            sheet: None,
        }
    }
}

pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table, CleanError> {
    if !path.exists() {
        return Err(CleanError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    match SourceFormat::from_path(path)? {
        SourceFormat::Delimited => load_delimited(path, options),
        SourceFormat::Spreadsheet => load_spreadsheet(path, options.sheet.as_deref()),
    }
}

fn malformed(path: &Path, reason: impl Into<String>) -> CleanError {
    CleanError::MalformedTable {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn load_delimited(path: &Path, options: &LoadOptions) -> Result<Table, CleanError> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    debug!(
        "Reading delimited table {:?} with delimiter '{}' ({})",
        path,
        crate::printable_delimiter(delimiter),
        options.encoding.name()
    );
    let mut reader = io_utils::open_csv_reader(path, delimiter)?;
    let header_record = reader
        .byte_headers()
        .map_err(|err| io_utils::csv_read_error(path, err))?
        .clone();
    if header_record.is_empty() {
        return Err(malformed(path, "missing header row"));
    }
    let raw_headers = io_utils::decode_record(&header_record, options.encoding)
        .ok_or_else(|| {
            malformed(
                path,
                format!("header row is not valid {}", options.encoding.name()),
            )
        })?;
    let headers = header_names(raw_headers);

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|err| io_utils::csv_read_error(path, err))?;
        if record.len() != headers.len() {
            return Err(malformed(
                path,
                format!(
                    "row {} has {} field(s) but the header has {}",
                    idx + 2,
                    record.len(),
                    headers.len()
                ),
            ));
        }
        let values = io_utils::decode_record(&record, options.encoding).ok_or_else(|| {
            malformed(
                path,
                format!("row {} is not valid {}", idx + 2, options.encoding.name()),
            )
        })?;
        rows.push(values.into_iter().map(Cell::from_raw).collect());
    }

    Table::new(headers, rows).map_err(|err| malformed(path, err.to_string()))
}

fn load_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<Table, CleanError> {
    let mut workbook = open_workbook_auto(path).map_err(|err| spreadsheet_error(path, err))?;
    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|candidate| candidate == name) {
                return Err(malformed(path, format!("sheet '{name}' not found")));
            }
            debug!("Reading sheet '{name}' from {path:?}");
            workbook
                .worksheet_range(name)
                .map_err(|err| spreadsheet_error(path, err))?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| malformed(path, "workbook has no sheets"))?
            .map_err(|err| spreadsheet_error(path, err))?,
    };

    let mut sheet_rows = range.rows();
    let header_row = sheet_rows
        .next()
        .ok_or_else(|| malformed(path, "missing header row"))?;
    let headers = header_names(header_row.iter().map(|cell| cell.to_string()).collect());
    let rows = sheet_rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Table::new(headers, rows).map_err(|err| malformed(path, err.to_string()))
}

fn spreadsheet_error(path: &Path, err: calamine::Error) -> CleanError {
    match err {
        calamine::Error::Io(source) => CleanError::Read {
            path: path.to_path_buf(),
            source,
        },
        other => malformed(path, other.to_string()),
    }
}

/// Trims header names; blank names get a positional `field_<n>` placeholder.
fn header_names(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                format!("field_{idx}")
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(text) => Cell::from_raw(text.as_str()),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::Bool(value) => Cell::Text(value.to_string()),
        Data::DateTime(_) => data
            .as_date()
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(data.to_string())),
        Data::DateTimeIso(text) => text
            .split('T')
            .next()
            .and_then(|date| NaiveDate::parse_from_str(date, CANONICAL_DATE_FORMAT).ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(text.clone())),
        Data::DurationIso(text) => Cell::Text(text.clone()),
        Data::Error(err) => Cell::Text(err.to_string()),
    }
}
