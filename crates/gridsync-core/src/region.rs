use gridsync_common::{RawCell, cell_at};
use serde::{Deserialize, Serialize};

use crate::options::Orientation;

/// Bounding rectangle of the first contiguous data block, in raw grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DataRegion {
    pub row_offset: usize,
    pub column_offset: usize,
    pub row_count: usize,
    pub column_count: usize,
}

impl DataRegion {
    pub fn end_row(&self) -> usize {
        self.row_offset + self.row_count
    }

    pub fn end_column(&self) -> usize {
        self.column_offset + self.column_count
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_offset..self.end_row()).contains(&row)
            && (self.column_offset..self.end_column()).contains(&col)
    }
}

fn row_is_blank(grid: &[Vec<RawCell>], row: usize, cols: std::ops::Range<usize>) -> bool {
    cols.into_iter().all(|c| cell_at(grid, row, c).is_none())
}

fn column_is_blank(grid: &[Vec<RawCell>], col: usize, rows: std::ops::Range<usize>) -> bool {
    rows.into_iter().all(|r| cell_at(grid, r, col).is_none())
}

/// Find the first contiguous data block. `None` means the grid holds no data.
///
/// The block starts at the first non-empty cell of the first non-empty row.
/// With `Rows`, the heading row fixes the width and the block ends at the
/// first row that is blank across that width. With `Columns`, the block ends
/// at the first blank column and extends down to the last row with data in
/// its span. Trailing empty rows and columns never change the result.
pub fn detect_region(grid: &[Vec<RawCell>], orientation: Orientation) -> Option<DataRegion> {
    let start_row = grid
        .iter()
        .position(|row| row.iter().any(|cell| !cell.is_empty()))?;
    let header = &grid[start_row];
    let start_col = header.iter().position(|cell| !cell.is_empty())?;

    let (end_row, end_col) = match orientation {
        Orientation::Rows => {
            let end_col = header.iter().rposition(|cell| !cell.is_empty())? + 1;
            let end_row = (start_row + 1..grid.len())
                .find(|&r| row_is_blank(grid, r, start_col..end_col))
                .unwrap_or(grid.len());
            (end_row, end_col)
        }
        Orientation::Columns => {
            let width = grid[start_row..].iter().map(Vec::len).max().unwrap_or(0);
            let end_col = (start_col + 1..width)
                .find(|&c| column_is_blank(grid, c, start_row..grid.len()))
                .unwrap_or(width);
            let end_row = (start_row..grid.len())
                .rev()
                .find(|&r| !row_is_blank(grid, r, start_col..end_col))
                .map_or(start_row + 1, |r| r + 1);
            (end_row, end_col)
        }
    };

    let region = DataRegion {
        row_offset: start_row,
        column_offset: start_col,
        row_count: end_row - start_row,
        column_count: end_col - start_col,
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        row_offset = region.row_offset,
        column_offset = region.column_offset,
        rows = region.row_count,
        columns = region.column_count,
        ?orientation,
        "detected data region"
    );

    Some(region)
}
