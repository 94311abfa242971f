//! Healthcare claims table cleaner.
//!
//! Loads a claims table from delimited text or a spreadsheet, trims and prunes
//! empty rows and columns, normalizes designated date columns to ISO-8601,
//! removes exact duplicate rows and writes a cleaned CSV together with a
//! [`CleaningReport`](report::CleaningReport).

pub mod clean;
pub mod cli;
pub mod config;
pub mod data;
pub mod dates;
pub mod dedup;
pub mod error;
pub mod io_utils;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod sanitize;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

pub use crate::{
    config::{CleanerConfig, DateColumnSet, UnparseablePolicy},
    data::{Cell, Table},
    error::CleanError,
    pipeline::{CleanedTable, Cleaner, RunOutcome},
    report::{CleaningReport, Stage},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("claims_cleaner", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let args = cli::CleanArgs::parse();
    clean::execute(&args)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
