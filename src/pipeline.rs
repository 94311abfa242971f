//! The cleaning pipeline: loader → sanitizer → date normalizer →
//! deduplicator → writer.
//!
//! A [`Cleaner`] owns its [`CleanerConfig`] and processes one file per call,
//! synchronously. Load failures end the run before anything is written. A
//! write failure does not discard the report: [`RunOutcome`] carries both.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use log::{info, warn};

use crate::{
    config::CleanerConfig,
    data::Table,
    dates, dedup,
    error::CleanError,
    io_utils,
    loader::{self, LoadOptions},
    report::{CleaningReport, ReportBuilder, Stage},
    sanitize,
};

#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub table: Table,
    pub report: CleaningReport,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: CleaningReport,
    /// Path of the written file, or why it could not be written.
    pub written: Result<PathBuf, CleanError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.written.is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct Cleaner {
    config: CleanerConfig,
    encoding: &'static Encoding,
    input_delimiter: Option<u8>,
    output_delimiter: u8,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Result<Self, CleanError> {
        config.validate()?;
        let encoding = io_utils::resolve_encoding(config.input_encoding.as_deref())?;
        let input_delimiter = config.input_delimiter()?;
        let output_delimiter = config.output_delimiter_byte()?;
        Ok(Self {
            config,
            encoding,
            input_delimiter,
            output_delimiter,
        })
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// `<input dir>/<prefix><input stem>.csv`, unless an explicit output is configured.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        if let Some(output) = &self.config.output {
            return output.clone();
        }
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "claims".to_string());
        input.with_file_name(format!("{}{stem}.csv", self.config.output_prefix))
    }

    pub fn load(&self, input: &Path) -> Result<Table, CleanError> {
        let options = LoadOptions {
            delimiter: self.input_delimiter,
            encoding: self.encoding,
            sheet: self.config.sheet.clone(),
        };
        loader::load_table(input, &options)
    }

    /// Runs the sanitizer, date normalizer and deduplicator over an already
    /// loaded table. Never fails.
    pub fn clean_table(&self, mut table: Table, input: &Path) -> CleanedTable {
        let mut report = ReportBuilder::new(
            input,
            &self.output_path_for(input),
            self.config.dates.describe(),
        );
        report.record_stage(Stage::Loaded, &table);

        let summary = sanitize::sanitize(&mut table, self.config.trim_whitespace);
        report
            .record_sanitize(summary)
            .record_stage(Stage::Sanitized, &table);

        let normalization = dates::normalize_dates(&mut table, &self.config.dates);
        if normalization.has_partial() {
            warn!("Some date values in {input:?} could not be normalized");
        }
        report
            .record_dates(normalization)
            .record_stage(Stage::DatesNormalized, &table);

        let duplicates = dedup::deduplicate(&mut table);
        report
            .record_duplicates(duplicates)
            .record_stage(Stage::Deduplicated, &table);

        CleanedTable {
            table,
            report: report.finish(),
        }
    }

    /// Loads and cleans `input` without writing anything.
    pub fn clean(&self, input: &Path) -> Result<CleanedTable, CleanError> {
        let table = self.load(input)?;
        info!(
            "Loaded {} row(s) x {} column(s) from {:?}",
            table.row_count(),
            table.column_count(),
            input
        );
        Ok(self.clean_table(table, input))
    }

    pub fn write(&self, table: &Table, output: &Path) -> Result<(), CleanError> {
        io_utils::write_table(
            table,
            output,
            self.output_delimiter,
            &self.config.dates.canonical_format,
        )
    }

    /// Full run: load, clean, write. Only load failures are returned as `Err`.
    pub fn run(&self, input: &Path) -> Result<RunOutcome, CleanError> {
        let CleanedTable { table, report } = self.clean(input)?;
        let output = report.output.clone();
        let written = match self.write(&table, &output) {
            Ok(()) => {
                info!(
                    "Wrote {} row(s) x {} column(s) to {:?}",
                    table.row_count(),
                    table.column_count(),
                    output
                );
                Ok(output)
            }
            Err(err) => {
                warn!("Could not write cleaned output: {err}");
                Err(err)
            }
        };
        Ok(RunOutcome { report, written })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_OUTPUT_PREFIX;

    #[test]
    fn output_path_prefixes_the_input_stem() {
        let cleaner = Cleaner::new(CleanerConfig::default()).unwrap();
        assert_eq!(
            cleaner.output_path_for(Path::new("/data/claims.xlsx")),
            PathBuf::from(format!("/data/{DEFAULT_OUTPUT_PREFIX}claims.csv"))
        );
        assert_eq!(
            cleaner.output_path_for(Path::new("claims.csv")),
            PathBuf::from("cleaned_claims.csv")
        );
    }

    #[test]
    fn explicit_output_wins() {
        let config = CleanerConfig {
            output: Some(PathBuf::from("/tmp/out/final.csv")),
            ..CleanerConfig::default()
        };
        let cleaner = Cleaner::new(config).unwrap();
        assert_eq!(
            cleaner.output_path_for(Path::new("/data/claims.csv")),
            PathBuf::from("/tmp/out/final.csv")
        );
    }

    #[test]
    fn new_rejects_unknown_encoding() {
        let config = CleanerConfig {
            input_encoding: Some("not-an-encoding".to_string()),
            ..CleanerConfig::default()
        };
        let err = Cleaner::new(config).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }
}
