//! Date column normalization.
//!
//! Every designated date column present in the table is rewritten to
//! [`Cell::Date`], which the writer renders in the canonical format. Source
//! values are matched against the configured formats in order and the first
//! successful parse wins. Empty cells are left alone; values that match no
//! format are handled by the configured [`UnparseablePolicy`] and reported,
//! never raised as errors.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::{DateColumnSet, UnparseablePolicy},
    data::{Cell, Table},
};

const MAX_FAILURE_SAMPLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DateColumnStatus {
    /// Every non-empty cell parsed.
    Normalized { parsed: usize },
    /// Some non-empty cells matched no accepted format.
    Partial {
        parsed: usize,
        unparsed: usize,
        samples: Vec<String>,
    },
    /// The designated column is not in the table.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateColumnOutcome {
    pub column: String,
    #[serde(flatten)]
    pub status: DateColumnStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateNormalization {
    pub columns: Vec<DateColumnOutcome>,
    /// Rows removed under [`UnparseablePolicy::DropRow`].
    pub dropped_rows: usize,
}

impl DateNormalization {
    pub fn has_partial(&self) -> bool {
        self.columns
            .iter()
            .any(|outcome| matches!(outcome.status, DateColumnStatus::Partial { .. }))
    }
}

/// Ordered list of source formats tried for every value.
#[derive(Debug, Clone)]
pub struct DateParser<'a> {
    formats: Vec<&'a str>,
}

impl<'a> DateParser<'a> {
    pub fn new(formats: Vec<&'a str>) -> Self {
        Self { formats }
    }

    pub fn from_set(set: &'a DateColumnSet) -> Self {
        Self::new(set.source_formats())
    }

    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        self.formats.iter().find_map(|format| {
            NaiveDate::parse_from_str(value, format)
                .or_else(|_| NaiveDateTime::parse_from_str(value, format).map(|dt| dt.date()))
                .ok()
                // `%Y` also accepts two-digit years; leave those to `%y`.
                .filter(|date| !format.contains("%Y") || date.year() >= 1000)
        })
    }

    fn parse_cell(&self, cell: &Cell) -> Option<NaiveDate> {
        match cell {
            Cell::Date(date) => Some(*date),
            Cell::Text(text) => self.parse(text),
            Cell::Number(_) => self.parse(&cell.to_string()),
            Cell::Empty => None,
        }
    }
}

pub fn normalize_dates(table: &mut Table, set: &DateColumnSet) -> DateNormalization {
    let parser = DateParser::from_set(set);
    let mut outcome = DateNormalization::default();
    let mut handled = HashSet::new();
    let mut drop_rows = vec![false; table.row_count()];

    for name in &set.names {
        let Some(column) = table.column_index_ignore_case(name) else {
            debug!("Date column '{name}' not present; skipping");
            outcome.columns.push(DateColumnOutcome {
                column: name.clone(),
                status: DateColumnStatus::Skipped,
            });
            continue;
        };
        if !handled.insert(column) {
            continue;
        }
        let status = normalize_column(
            table,
            column,
            &parser,
            set.on_unparseable,
            &mut drop_rows,
        );
        let header = table.headers()[column].clone();
        match &status {
            DateColumnStatus::Partial {
                unparsed, samples, ..
            } => warn!(
                "Date column '{header}' partially normalized: {unparsed} value(s) unparsed (e.g. {samples:?})"
            ),
            DateColumnStatus::Normalized { parsed } => {
                info!("Normalized {parsed} value(s) in date column '{header}'")
            }
            DateColumnStatus::Skipped => {}
        }
        outcome.columns.push(DateColumnOutcome {
            column: header,
            status,
        });
    }

    if set.on_unparseable == UnparseablePolicy::DropRow {
        let keep = drop_rows.iter().map(|drop| !drop).collect::<Vec<_>>();
        outcome.dropped_rows = table.retain_rows(&keep);
        if outcome.dropped_rows > 0 {
            info!(
                "Dropped {} row(s) with unparseable dates",
                outcome.dropped_rows
            );
        }
    }
    outcome
}

fn normalize_column(
    table: &mut Table,
    column: usize,
    parser: &DateParser<'_>,
    policy: UnparseablePolicy,
    drop_rows: &mut [bool],
) -> DateColumnStatus {
    let mut parsed = 0usize;
    let mut unparsed = 0usize;
    let mut samples = Vec::new();

    for (row, drop) in drop_rows.iter_mut().enumerate() {
        let Some(cell) = table.cell_mut(row, column) else {
            continue;
        };
        if cell.is_empty() {
            continue;
        }
        if let Some(date) = parser.parse_cell(cell) {
            *cell = Cell::Date(date);
            parsed += 1;
            continue;
        }
        unparsed += 1;
        let original = cell.to_string();
        if samples.len() < MAX_FAILURE_SAMPLES && !samples.contains(&original) {
            samples.push(original);
        }
        match policy {
            UnparseablePolicy::Keep => {}
            UnparseablePolicy::Clear => *cell = Cell::Empty,
            UnparseablePolicy::DropRow => *drop = true,
        }
    }

    if unparsed == 0 {
        DateColumnStatus::Normalized { parsed }
    } else {
        DateColumnStatus::Partial {
            parsed,
            unparsed,
            samples,
        }
    }
}
