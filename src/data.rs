//! In-memory table model shared by every cleaning stage.
//!
//! A [`Table`] is a header row plus row-major [`Cell`] storage. Construction
//! through [`Table::new`] guarantees that column names are unique and that
//! every row is exactly as wide as the header; the stages only ever remove
//! whole rows or whole columns, so the invariant holds for the whole run.

use std::{
    borrow::Cow,
    collections::HashSet,
    fmt::{self, Write},
};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Builds a cell from a raw field. Only the zero-length string maps to
    /// [`Cell::Empty`]; whitespace is preserved until the sanitizer trims it.
    pub fn from_raw(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    /// Null, the empty string and whitespace-only text are all empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) | Cell::Date(_) => false,
        }
    }

    pub fn render(&self, date_format: &str) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(text) => Cow::Borrowed(text.as_str()),
            Cell::Number(number) => Cow::Owned(format_number(*number)),
            Cell::Date(date) => Cow::Owned(
                format_date(*date, date_format)
                    .unwrap_or_else(|| date.format(CANONICAL_DATE_FORMAT).to_string()),
            ),
        }
    }

    /// Equality key used for duplicate detection.
    pub fn key(&self) -> CellKey<'_> {
        match self {
            Cell::Empty => CellKey::Empty,
            Cell::Text(text) if text.trim().is_empty() => CellKey::Empty,
            Cell::Text(text) => CellKey::Text(text),
            Cell::Number(number) if *number == 0.0 => CellKey::Number(0),
            Cell::Number(number) => CellKey::Number(number.to_bits()),
            Cell::Date(date) => CellKey::Date(*date),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(CANONICAL_DATE_FORMAT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey<'a> {
    Empty,
    Text(&'a str),
    Number(u64),
    Date(NaiveDate),
}

/// Formats `date` with a strftime pattern. `None` when the pattern needs
/// fields a plain date does not have, such as hours.
pub fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", date.format(format)).ok()?;
    Some(rendered)
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("duplicate column name '{0}' in header row")]
    DuplicateColumn(String),
    #[error("row {row} has {found} field(s) but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(headers.len());
        for name in &headers {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(TableError::RaggedRow {
                    row: idx + 1,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn column_index_ignore_case(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(wanted))
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|cells| cells.get_mut(column))
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.rows.iter_mut().flat_map(|row| row.iter_mut())
    }

    /// Keeps rows whose flag in `keep` is true, preserving order. Rows beyond
    /// the end of `keep` are kept. Returns the number of rows removed.
    pub fn retain_rows(&mut self, keep: &[bool]) -> usize {
        let before = self.rows.len();
        let mut flags = keep.iter().copied();
        self.rows.retain(|_| flags.next().unwrap_or(true));
        before - self.rows.len()
    }

    /// Keeps columns whose flag in `keep` is true, preserving order. Returns
    /// the names of the removed columns.
    pub fn retain_columns(&mut self, keep: &[bool]) -> Vec<String> {
        let flag = |idx: usize| keep.get(idx).copied().unwrap_or(true);
        let removed = self
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !flag(*idx))
            .map(|(_, name)| name.clone())
            .collect::<Vec<_>>();
        if removed.is_empty() {
            return removed;
        }
        let mut idx = 0;
        self.headers.retain(|_| {
            let keep = flag(idx);
            idx += 1;
            keep
        });
        for row in &mut self.rows {
            let mut idx = 0;
            row.retain(|_| {
                let keep = flag(idx);
                idx += 1;
                keep
            });
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Cell {
        Cell::from_raw(value)
    }

    #[test]
    fn format_date_rejects_time_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(format_date(date, "%m/%d/%Y").as_deref(), Some("12/31/2024"));
        assert_eq!(format_date(date, "%Y-%m-%d %H:%M"), None);
        assert_eq!(Cell::Date(date).render("%Y-%m-%d %H:%M"), "2024-12-31");
    }

    #[test]
    fn emptiness_covers_null_empty_and_whitespace() {
        assert!(Cell::Empty.is_empty());
        assert!(text("").is_empty());
        assert!(text("   \t").is_empty());
        assert!(!text(" x ").is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }

    #[test]
    fn empty_representations_share_a_key() {
        assert_eq!(Cell::Empty.key(), text("  ").key());
        assert_eq!(Cell::Number(0.0).key(), Cell::Number(-0.0).key());
        assert_ne!(text("200").key(), Cell::Number(200.0).key());
    }

    #[test]
    fn render_formats_numbers_and_dates() {
        assert_eq!(Cell::Number(200.0).render(CANONICAL_DATE_FORMAT), "200");
        assert_eq!(Cell::Number(12.5).render(CANONICAL_DATE_FORMAT), "12.5");
        let date = NaiveDate::from_ymd_opt(1980, 1, 2).unwrap();
        assert_eq!(Cell::Date(date).render(CANONICAL_DATE_FORMAT), "1980-01-02");
        assert_eq!(Cell::Date(date).render("%m/%d/%Y"), "01/02/1980");
    }

    #[test]
    fn new_rejects_duplicate_headers_and_ragged_rows() {
        let duplicate = Table::new(vec!["a".into(), "a".into()], Vec::new());
        assert_eq!(
            duplicate.unwrap_err(),
            TableError::DuplicateColumn("a".to_string())
        );

        let ragged = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![text("1"), text("2")], vec![text("3")]],
        );
        assert_eq!(
            ragged.unwrap_err(),
            TableError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn retain_preserves_survivor_order() {
        let mut table = Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![text("1"), text("x"), text("p")],
                vec![text("2"), text("y"), text("q")],
                vec![text("3"), text("z"), text("r")],
            ],
        )
        .unwrap();

        assert_eq!(table.retain_rows(&[true, false, true]), 1);
        let removed = table.retain_columns(&[true, false, true]);
        assert_eq!(removed, vec!["b".to_string()]);
        assert_eq!(table.headers(), &["a".to_string(), "c".to_string()]);
        assert_eq!(
            table.rows(),
            &[vec![text("1"), text("p")], vec![text("3"), text("r")]]
        );
    }

    #[test]
    fn column_lookup_ignores_case_when_asked() {
        let table = Table::new(vec!["DOB".into(), "Amount".into()], Vec::new()).unwrap();
        assert_eq!(table.column_index("dob"), None);
        assert_eq!(table.column_index_ignore_case("dob"), Some(0));
    }
}
