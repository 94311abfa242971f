//! Typed failures for a cleaning run.
//!
//! Every variant is terminal for the run. Per-cell date parse failures are not
//! errors; they are recorded in the [`CleaningReport`](crate::report::CleaningReport).

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Input file {path:?} does not exist")]
    FileNotFound { path: PathBuf },

    #[error(
        "Unsupported file type '{extension}' for {path:?} (expected .csv, .tsv, .xlsx, .xlsm, .xls, .xlsb or .ods)"
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Malformed table in {path:?}: {reason}")]
    MalformedTable { path: PathBuf, reason: String },

    #[error("Failed reading {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed writing {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CleanError {
    /// Short, stable name of the failure kind, surfaced to the user next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            CleanError::FileNotFound { .. } => "FileNotFoundError",
            CleanError::UnsupportedFormat { .. } => "UnsupportedFormatError",
            CleanError::MalformedTable { .. } => "MalformedTableError",
            CleanError::Read { .. } => "ReadError",
            CleanError::Write { .. } => "WriteError",
            CleanError::Config(_) => "ConfigError",
        }
    }
}
