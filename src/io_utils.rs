//! I/O utilities for delimited-text reading and writing.
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//!   Output is always UTF-8.
//! - **Reader/writer construction**: `open_csv_reader` and `write_table`.
//!
//! File handles never outlive the call that opened them.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::{data::Table, error::CleanError};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, CleanError> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| CleanError::Config(format!("unknown encoding '{value}'")))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Opens a headered reader. Rows are read flexibly so that ragged rows can be
/// reported with their row number instead of a generic parse failure.
pub fn open_csv_reader(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<BufReader<File>>, CleanError> {
    let file = File::open(path).map_err(|source| CleanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    Ok(builder.from_reader(BufReader::new(file)))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Option<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Splits a csv error into the read/malformed kinds of [`CleanError`].
pub fn csv_read_error(path: &Path, err: csv::Error) -> CleanError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => CleanError::Read {
            path: path.to_path_buf(),
            source,
        },
        _ => CleanError::MalformedTable {
            path: path.to_path_buf(),
            reason,
        },
    }
}

/// Writes `table` as delimited text, creating missing parent directories.
///
/// Rows go to a hidden `.tmp` sibling that is renamed over `path` once the
/// writer is flushed, so a failed write never leaves a partial file behind.
pub fn write_table(
    table: &Table,
    path: &Path,
    delimiter: u8,
    date_format: &str,
) -> Result<(), CleanError> {
    let write_error = |source: std::io::Error| CleanError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
    }
    let tmp_path = staging_path(path);
    let result = write_rows(table, &tmp_path, delimiter, date_format)
        .and_then(|()| fs::rename(&tmp_path, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(err));
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

fn write_rows(
    table: &Table,
    tmp_path: &Path,
    delimiter: u8,
    date_format: &str,
) -> io::Result<()> {
    let file = File::create(tmp_path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .from_writer(BufWriter::new(file));

    if table.column_count() > 0 {
        writer.write_record(table.headers())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.render(date_format).into_owned()))?;
        }
    }
    let mut inner = writer.into_inner().map_err(|err| err.into_error())?;
    inner.flush()
}
