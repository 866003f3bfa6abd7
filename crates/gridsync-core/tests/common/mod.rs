#![allow(dead_code)]

use gridsync_core::{RawCell, RawGrid};

/// Text grid; `""` is an empty cell.
pub fn grid(rows: &[&[&str]]) -> RawGrid {
    rows.iter()
        .map(|row| row.iter().map(|s| RawCell::from(*s)).collect())
        .collect()
}

/// Text grid where cells that parse as numbers are stored as numbers.
pub fn typed_grid(rows: &[&[&str]]) -> RawGrid {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|s| match s.parse::<f64>() {
                    Ok(n) => RawCell::from(n),
                    Err(_) => RawCell::from(*s),
                })
                .collect()
        })
        .collect()
}

/// Display text of the cell at `(row, col)`, `""` when empty or missing.
pub fn text_at(grid: &RawGrid, row: usize, col: usize) -> String {
    grid.get(row)
        .and_then(|r| r.get(col))
        .map(RawCell::heading_text)
        .unwrap_or_default()
}
