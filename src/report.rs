//! Cleaning report: per-stage row/column counts and date column outcomes.
//!
//! A [`ReportBuilder`] records one entry per stage while the pipeline runs and
//! is frozen into a [`CleaningReport`] once the last stage finishes. The
//! report serializes with `serde` and renders a textual summary through
//! [`fmt::Display`].

use std::{
    fmt,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    config::DateSetDescription,
    data::Table,
    dates::{DateColumnOutcome, DateColumnStatus, DateNormalization},
    sanitize::SanitizeSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Loaded,
    Sanitized,
    DatesNormalized,
    Deduplicated,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Loaded => "loaded",
            Stage::Sanitized => "sanitized",
            Stage::DatesNormalized => "dates normalized",
            Stage::Deduplicated => "deduplicated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub stage: Stage,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stages: Vec<StageCounts>,
    pub trimmed_cells: usize,
    pub dropped_columns: Vec<String>,
    pub duplicate_rows: usize,
    pub date_columns: Vec<DateColumnOutcome>,
    pub date_formats: DateSetDescription,
}

impl CleaningReport {
    pub fn counts_at(&self, stage: Stage) -> Option<StageCounts> {
        self.stages.iter().copied().find(|counts| counts.stage == stage)
    }

    /// Row counts at each stage that can change them. The date stage only
    /// appears when it removed rows.
    pub fn row_trajectory(&self) -> Vec<(Stage, usize)> {
        let mut trajectory = Vec::with_capacity(self.stages.len());
        let mut sanitized_rows = None;
        for counts in &self.stages {
            match counts.stage {
                Stage::Sanitized => sanitized_rows = Some(counts.rows),
                Stage::DatesNormalized if sanitized_rows == Some(counts.rows) => continue,
                _ => {}
            }
            trajectory.push((counts.stage, counts.rows));
        }
        trajectory
    }

    pub fn columns_before(&self) -> usize {
        self.stages.first().map(|counts| counts.columns).unwrap_or(0)
    }

    pub fn columns_after(&self) -> usize {
        self.stages.last().map(|counts| counts.columns).unwrap_or(0)
    }

    pub fn rows_after(&self) -> usize {
        self.stages.last().map(|counts| counts.rows).unwrap_or(0)
    }

    fn date_columns_with<'a>(
        &'a self,
        predicate: impl Fn(&DateColumnStatus) -> bool + 'a,
    ) -> impl Iterator<Item = &'a DateColumnOutcome> + 'a {
        self.date_columns
            .iter()
            .filter(move |outcome| predicate(&outcome.status))
    }

    pub fn normalized_columns(&self) -> Vec<&str> {
        self.date_columns_with(|status| matches!(status, DateColumnStatus::Normalized { .. }))
            .map(|outcome| outcome.column.as_str())
            .collect()
    }

    pub fn partial_columns(&self) -> Vec<&str> {
        self.date_columns_with(|status| matches!(status, DateColumnStatus::Partial { .. }))
            .map(|outcome| outcome.column.as_str())
            .collect()
    }

    pub fn skipped_columns(&self) -> Vec<&str> {
        self.date_columns_with(|status| matches!(status, DateColumnStatus::Skipped))
            .map(|outcome| outcome.column.as_str())
            .collect()
    }

    /// True when some date values could not be normalized.
    pub fn has_residual_issues(&self) -> bool {
        !self.partial_columns().is_empty()
    }
}

fn file_label(path: &Path) -> String {
    path.display().to_string()
}

fn list_or_none<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let joined = names.into_iter().join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trajectory = self.row_trajectory();
        writeln!(f, "Cleaning report")?;
        writeln!(f, "  Input:   {}", file_label(&self.input))?;
        writeln!(f, "  Output:  {}", file_label(&self.output))?;
        writeln!(
            f,
            "  Rows:    {} ({})",
            trajectory.iter().map(|(_, rows)| rows).join(" → "),
            trajectory.iter().map(|(stage, _)| stage.label()).join(" → ")
        )?;
        writeln!(
            f,
            "  Columns: {} → {}",
            self.columns_before(),
            self.columns_after()
        )?;
        writeln!(
            f,
            "  Dropped columns: {}",
            list_or_none(self.dropped_columns.iter().map(String::as_str))
        )?;
        writeln!(f, "  Duplicate rows removed: {}", self.duplicate_rows)?;
        writeln!(f, "  Trimmed cells: {}", self.trimmed_cells)?;
        writeln!(
            f,
            "  Date columns normalized: {}",
            list_or_none(self.normalized_columns())
        )?;
        for outcome in &self.date_columns {
            if let DateColumnStatus::Partial {
                unparsed, samples, ..
            } = &outcome.status
            {
                writeln!(
                    f,
                    "  Date column partially normalized: {} ({} value(s) left unparsed, e.g. {})",
                    outcome.column,
                    unparsed,
                    samples.iter().map(|s| format!("'{s}'")).join(", ")
                )?;
            }
        }
        let skipped = self.skipped_columns();
        if self.date_formats.default_names && !skipped.is_empty() {
            writeln!(
                f,
                "  Date columns skipped (not present): {} of the default names",
                skipped.len()
            )?;
        } else {
            writeln!(
                f,
                "  Date columns skipped (not present): {}",
                list_or_none(skipped)
            )?;
        }
        write!(
            f,
            "  Date format: {} (accepted: {})",
            self.date_formats.canonical_format,
            self.date_formats.accepted_source_formats.join(", ")
        )
    }
}

#[derive(Debug, Clone)]
pub struct ReportBuilder {
    input: PathBuf,
    output: PathBuf,
    date_formats: DateSetDescription,
    stages: Vec<StageCounts>,
    trimmed_cells: usize,
    dropped_columns: Vec<String>,
    duplicate_rows: usize,
    date_columns: Vec<DateColumnOutcome>,
}

impl ReportBuilder {
    pub fn new(input: &Path, output: &Path, date_formats: DateSetDescription) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            date_formats,
            stages: Vec::with_capacity(4),
            trimmed_cells: 0,
            dropped_columns: Vec::new(),
            duplicate_rows: 0,
            date_columns: Vec::new(),
        }
    }

    pub fn record_stage(&mut self, stage: Stage, table: &Table) -> &mut Self {
        self.stages.push(StageCounts {
            stage,
            rows: table.row_count(),
            columns: table.column_count(),
        });
        self
    }

    pub fn record_sanitize(&mut self, summary: SanitizeSummary) -> &mut Self {
        self.trimmed_cells = summary.trimmed_cells;
        self.dropped_columns = summary.dropped_columns;
        self
    }

    pub fn record_dates(&mut self, normalization: DateNormalization) -> &mut Self {
        self.date_columns = normalization.columns;
        self
    }

    pub fn record_duplicates(&mut self, removed: usize) -> &mut Self {
        self.duplicate_rows = removed;
        self
    }

    pub fn finish(self) -> CleaningReport {
        CleaningReport {
            input: self.input,
            output: self.output,
            stages: self.stages,
            trimmed_cells: self.trimmed_cells,
            dropped_columns: self.dropped_columns,
            duplicate_rows: self.duplicate_rows,
            date_columns: self.date_columns,
            date_formats: self.date_formats,
        }
    }
}
