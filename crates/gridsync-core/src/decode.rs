use gridsync_common::{RawCell, RawGrid, Value, cell_at};

use crate::cell::decode_cell;
use crate::error::SyncError;
use crate::headings::{Warning, normalize_headings};
use crate::options::{Orientation, SyncOptions};
use crate::record::{Collection, Record};
use crate::region::{DataRegion, detect_region};
use crate::state::SyncState;

/// A decoded grid together with the state a later write needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub collection: Collection,
    pub warnings: Vec<Warning>,
    pub region: DataRegion,
    pub state: SyncState,
}

/// Swap rows and columns, filling ragged gaps with `T::default()`.
pub(crate) fn transpose<T: Clone + Default>(lines: Vec<Vec<T>>) -> Vec<Vec<T>> {
    let width = lines.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|c| {
            lines
                .iter()
                .map(|line| line.get(c).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

fn extract(grid: &RawGrid, region: &DataRegion) -> Vec<Vec<RawCell>> {
    (region.row_offset..region.end_row())
        .map(|r| {
            (region.column_offset..region.end_column())
                .map(|c| cell_at(grid, r, c).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Decode a raw grid into a collection. `Ok(None)` means the grid holds no data.
pub fn decode_grid(
    grid: &RawGrid,
    options: &SyncOptions,
    range_provided: bool,
) -> Result<Option<Decoded>, SyncError> {
    let Some(region) = detect_region(grid, options.orientation) else {
        return Ok(None);
    };

    let mut lines = extract(grid, &region);
    if options.orientation == Orientation::Columns {
        lines = transpose(lines);
    }
    let mut lines = lines.into_iter();
    let header: Vec<String> = lines
        .next()
        .unwrap_or_default()
        .iter()
        .map(RawCell::heading_text)
        .collect();

    let headings = normalize_headings(header, options.transform_headings, range_provided)?;
    let rows: Vec<Vec<Value>> = lines
        .map(|line| {
            line.iter()
                .map(|cell| decode_cell(cell, options.render_formatted))
                .collect()
        })
        .collect();
    let record_count = rows.len();

    let keys = headings.keys();
    let collection = if keys.len() == 1 {
        Collection::Column {
            heading: keys[0].clone(),
            values: rows.into_iter().flatten().collect(),
        }
    } else {
        Collection::Records(
            rows.into_iter()
                .map(|row| {
                    keys.iter()
                        .zip(row)
                        .filter(|(key, _)| !key.trim().is_empty())
                        .map(|(key, value)| (key.clone(), value))
                        .collect::<Record>()
                })
                .collect(),
        )
    };

    let state = SyncState {
        last_grid: Some(grid.clone()),
        record_count,
        row_offset: region.row_offset,
        column_offset: region.column_offset,
        width: headings.len(),
        raw_headers: Some(headings.raw.clone()),
        normalized_headers: headings.normalized.clone(),
    };

    Ok(Some(Decoded {
        collection,
        warnings: headings.warnings,
        region,
        state,
    }))
}
