//! Whitespace trimming and removal of fully-empty rows and columns.

use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use crate::data::{Cell, Table};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeSummary {
    pub trimmed_cells: usize,
    pub dropped_rows: usize,
    pub dropped_columns: Vec<String>,
}

/// Trims surrounding whitespace from text cells; whitespace-only text becomes
/// [`Cell::Empty`]. Returns the number of cells changed.
pub fn trim_whitespace(table: &mut Table) -> usize {
    let mut changed = 0;
    for cell in table.cells_mut() {
        let Cell::Text(text) = &*cell else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.len() == text.len() {
            continue;
        }
        let replacement = Cell::from_raw(trimmed);
        *cell = replacement;
        changed += 1;
    }
    changed
}

pub fn is_empty_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}

pub fn drop_empty_rows(table: &mut Table) -> usize {
    let keep = table
        .rows()
        .iter()
        .map(|row| !is_empty_row(row))
        .collect::<Vec<_>>();
    table.retain_rows(&keep)
}

/// Drops every column with no non-empty cell. A table without rows loses all
/// of its columns.
pub fn drop_empty_columns(table: &mut Table) -> Vec<String> {
    let keep = (0..table.column_count())
        .map(|idx| table.column(idx).any(|cell| !cell.is_empty()))
        .collect::<Vec<_>>();
    table.retain_columns(&keep)
}

pub fn sanitize(table: &mut Table, trim: bool) -> SanitizeSummary {
    let trimmed_cells = if trim { trim_whitespace(table) } else { 0 };
    if trimmed_cells > 0 {
        debug!("Trimmed surrounding whitespace in {trimmed_cells} cell(s)");
    }
    let dropped_rows = drop_empty_rows(table);
    info!("Dropped {dropped_rows} fully-empty row(s)");
    let dropped_columns = drop_empty_columns(table);
    if dropped_columns.is_empty() {
        info!("Dropped 0 fully-empty column(s)");
    } else {
        info!(
            "Dropped {} fully-empty column(s): {}",
            dropped_columns.len(),
            dropped_columns.iter().join(", ")
        );
    }
    SanitizeSummary {
        trimmed_cells,
        dropped_rows,
        dropped_columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Cell::from_raw(*v)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn trims_text_and_collapses_whitespace_only_cells() {
        let mut t = table(&["a", "b"], &[&[" x ", "   "], &["y", ""]]);
        assert_eq!(trim_whitespace(&mut t), 2);
        assert_eq!(t.cell(0, 0), Some(&Cell::Text("x".to_string())));
        assert_eq!(t.cell(0, 1), Some(&Cell::Empty));
        assert_eq!(t.cell(1, 0), Some(&Cell::Text("y".to_string())));
    }

    #[test]
    fn drops_only_fully_empty_rows() {
        let mut t = table(
            &["a", "b"],
            &[&["1", ""], &["", "  "], &["", "2"], &["", ""]],
        );
        assert_eq!(drop_empty_rows(&mut t), 2);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.cell(0, 0), Some(&Cell::Text("1".to_string())));
        assert_eq!(t.cell(1, 1), Some(&Cell::Text("2".to_string())));
    }

    #[test]
    fn drops_fully_empty_columns_in_order() {
        let mut t = table(
            &["id", "blank", "note", "spaces"],
            &[&["1", "", "a", " "], &["2", "", "", ""]],
        );
        assert_eq!(drop_empty_columns(&mut t), vec!["blank", "spaces"]);
        assert_eq!(t.headers(), &["id", "note"]);
    }

    #[test]
    fn zero_row_tables_lose_every_column() {
        let mut t = table(&["a", "b"], &[&["", ""]]);
        let summary = sanitize(&mut t, true);
        assert_eq!(summary.dropped_rows, 1);
        assert_eq!(summary.dropped_columns, vec!["a", "b"]);
        assert_eq!(t.row_count(), 0);
        assert_eq!(t.column_count(), 0);
    }

    #[test]
    fn sanitize_without_trim_keeps_padding() {
        let mut t = table(&["a"], &[&[" x "]]);
        let summary = sanitize(&mut t, false);
        assert_eq!(summary.trimmed_cells, 0);
        assert_eq!(t.cell(0, 0), Some(&Cell::Text(" x ".to_string())));
    }
}
