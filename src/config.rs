//! Pipeline configuration.
//!
//! [`CleanerConfig`] is an explicit value handed to
//! [`Cleaner::new`](crate::pipeline::Cleaner::new). It carries the designated
//! date columns, the ordered list of accepted source date formats, the
//! unparseable-date policy and the output naming rules. A YAML file with any
//! subset of the fields can be loaded with [`CleanerConfig::load`]; missing
//! fields fall back to [`Default`].

use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use chrono::{
    NaiveDate,
    format::{Item, StrftimeItems},
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    data::{CANONICAL_DATE_FORMAT, format_date},
    error::CleanError,
};

pub const DEFAULT_OUTPUT_PREFIX: &str = "cleaned_";

/// Day and month differ so swapped fields fail the round trip.
fn canonical_sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(NaiveDate::MIN)
}

const DEFAULT_DATE_COLUMNS: &[&str] = &[
    "DOB",
    "DOS",
    "DateOfBirth",
    "DateOfService",
    "ServiceDate",
    "date_of_birth",
    "date_of_service",
    "service_date",
];

// Month-first slash dates come before anything day-first; claims data is US-sourced.
const DEFAULT_SOURCE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%Y%m%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// What to do with a non-empty date cell that matches none of the accepted formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum UnparseablePolicy {
    /// Leave the original value in place
    #[default]
    Keep,
    /// Replace the value with an empty cell
    Clear,
    /// Remove the whole row from the output
    DropRow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateColumnSet {
    pub names: Vec<String>,
    pub canonical_format: String,
    pub accepted_source_formats: Vec<String>,
    pub on_unparseable: UnparseablePolicy,
}

impl Default for DateColumnSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_DATE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            canonical_format: CANONICAL_DATE_FORMAT.to_string(),
            accepted_source_formats: DEFAULT_SOURCE_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            on_unparseable: UnparseablePolicy::Keep,
        }
    }
}

/// Human-readable view of a [`DateColumnSet`], used in logs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSetDescription {
    pub names: Vec<String>,
    /// True when `names` is the built-in list rather than a configured one.
    pub default_names: bool,
    pub canonical_format: String,
    pub accepted_source_formats: Vec<String>,
}

impl DateColumnSet {
    /// Formats in the order they are attempted. The canonical format is always
    /// tried first so canonical input round-trips unchanged.
    pub fn source_formats(&self) -> Vec<&str> {
        let mut formats = Vec::with_capacity(self.accepted_source_formats.len() + 1);
        formats.push(self.canonical_format.as_str());
        for format in &self.accepted_source_formats {
            if !formats.contains(&format.as_str()) {
                formats.push(format.as_str());
            }
        }
        formats
    }

    pub fn describe(&self) -> DateSetDescription {
        DateSetDescription {
            names: self.names.clone(),
            default_names: self
                .names
                .iter()
                .map(String::as_str)
                .eq(DEFAULT_DATE_COLUMNS.iter().copied()),
            canonical_format: format_label(&self.canonical_format),
            accepted_source_formats: self
                .source_formats()
                .into_iter()
                .map(format_label)
                .collect(),
        }
    }

    fn validate(&self) -> Result<(), CleanError> {
        if self.canonical_format.trim().is_empty() {
            return Err(CleanError::Config(
                "canonical date format cannot be empty".to_string(),
            ));
        }
        for format in self.source_formats() {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(CleanError::Config(format!(
                    "invalid date format '{format}'"
                )));
            }
        }
        self.validate_canonical_round_trip()
    }

    /// The canonical format must render a plain date and parse its own output
    /// back to the same date.
    fn validate_canonical_round_trip(&self) -> Result<(), CleanError> {
        let format = self.canonical_format.as_str();
        let sample = canonical_sample_date();
        let rendered = format_date(sample, format).ok_or_else(|| {
            CleanError::Config(format!(
                "canonical date format '{format}' cannot render a date without a time"
            ))
        })?;
        match NaiveDate::parse_from_str(&rendered, format) {
            Ok(parsed) if parsed == sample => Ok(()),
            _ => Err(CleanError::Config(format!(
                "canonical date format '{format}' does not parse its own output '{rendered}'"
            ))),
        }
    }
}

/// Renders a strftime pattern with the `YYYY-MM-DD` style labels people expect.
pub fn format_label(format: &str) -> String {
    let mut label = String::with_capacity(format.len() + 4);
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            label.push(ch);
            continue;
        }
        match chars.next() {
            Some('Y') => label.push_str("YYYY"),
            Some('y') => label.push_str("YY"),
            Some('m') => label.push_str("MM"),
            Some('d') => label.push_str("DD"),
            Some('H') => label.push_str("HH"),
            Some('M') => label.push_str("mm"),
            Some('S') => label.push_str("ss"),
            Some(other) => {
                label.push('%');
                label.push(other);
            }
            None => label.push('%'),
        }
    }
    label
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub dates: DateColumnSet,
    pub output_prefix: String,
    /// Explicit output path; derived from the input name when absent.
    pub output: Option<PathBuf>,
    /// Input separator override; the extension decides when absent.
    pub delimiter: Option<char>,
    pub output_delimiter: char,
    pub input_encoding: Option<String>,
    pub sheet: Option<String>,
    pub trim_whitespace: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            dates: DateColumnSet::default(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output: None,
            delimiter: None,
            output_delimiter: ',',
            input_encoding: None,
            sheet: None,
            trim_whitespace: true,
        }
    }
}

impl CleanerConfig {
    pub fn load(path: &Path) -> Result<Self, CleanError> {
        let file = File::open(path)
            .map_err(|err| CleanError::Config(format!("opening {path:?}: {err}")))?;
        let config: CleanerConfig = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|err| CleanError::Config(format!("parsing {path:?}: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CleanError> {
        self.dates.validate()?;
        if let Some(delimiter) = self.delimiter {
            delimiter_byte(delimiter)?;
        }
        delimiter_byte(self.output_delimiter)?;
        if self.output_prefix.contains(['/', '\\']) {
            return Err(CleanError::Config(format!(
                "output prefix '{}' cannot contain path separators",
                self.output_prefix
            )));
        }
        Ok(())
    }

    pub fn input_delimiter(&self) -> Result<Option<u8>, CleanError> {
        self.delimiter.map(delimiter_byte).transpose()
    }

    pub fn output_delimiter_byte(&self) -> Result<u8, CleanError> {
        delimiter_byte(self.output_delimiter)
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8, CleanError> {
    if delimiter.is_ascii() && delimiter != '"' && delimiter != '\n' && delimiter != '\r' {
        Ok(delimiter as u8)
    } else {
        Err(CleanError::Config(format!(
            "delimiter {delimiter:?} must be a single ASCII character other than a quote or newline"
        )))
    }
}
