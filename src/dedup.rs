//! Exact duplicate-row removal.

use std::collections::HashSet;

use log::info;

use crate::data::{Cell, CellKey, Table};

fn row_key(row: &[Cell]) -> Vec<CellKey<'_>> {
    row.iter().map(Cell::key).collect()
}

/// Removes every row equal, cell for cell, to an earlier row. The first
/// occurrence survives and survivor order is unchanged. Returns the number of
/// rows removed.
pub fn deduplicate(table: &mut Table) -> usize {
    let keep = {
        let mut seen = HashSet::with_capacity(table.row_count());
        table
            .rows()
            .iter()
            .map(|row| seen.insert(row_key(row)))
            .collect::<Vec<_>>()
    };
    let removed = table.retain_rows(&keep);
    info!("Dropped {removed} duplicate row(s)");
    removed
}
