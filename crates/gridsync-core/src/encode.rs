use std::collections::HashSet;

use gridsync_common::Value;

use crate::decode::transpose;
use crate::error::SyncError;
use crate::options::Orientation;
use crate::record::{Collection, Record};
use crate::state::SyncState;
use crate::transport::{WriteCell, WriteGrid};

/// An encoded write, anchored at the origin of the last read.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub grid: WriteGrid,
    /// Data lines in the collection, not counting blanked stale lines.
    pub record_count: usize,
    /// Heading line as written, one entry per column of the region.
    /// Untouched and erased columns hold `""`.
    pub headings: Vec<String>,
    /// Record key for each entry of `headings`, `""` where no field was written.
    pub keys: Vec<String>,
}

/// What a column of the region receives on write.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    /// Values of the field at this index of the key list.
    Field(usize),
    /// Column under a blank heading; its cells are left as they are.
    Keep,
    /// Column whose field is gone; heading and values are cleared.
    Erase,
}

fn to_cell(value: &Value) -> WriteCell {
    WriteCell::Set(value.to_scalar())
}

fn check_schema(records: &[Record], keys: &[&str]) -> Result<(), SyncError> {
    for (i, record) in records.iter().enumerate() {
        if record.len() != keys.len() || !keys.iter().all(|k| record.contains_key(k)) {
            let found: Vec<&str> = record.keys().collect();
            return Err(SyncError::schema(format!(
                "record {i} has fields {found:?}, expected {keys:?}"
            )));
        }
    }
    Ok(())
}

/// Keys the last read or write produced, position by position.
fn previous_keys(state: &SyncState) -> &[String] {
    state
        .normalized_headers
        .as_ref()
        .or(state.raw_headers.as_ref())
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Keys and values of the collection, one line per record.
fn logical_lines(
    collection: &Collection,
    state: &SyncState,
) -> Result<Option<(Vec<String>, Vec<Vec<Value>>)>, SyncError> {
    match collection {
        Collection::Records(records) => {
            let Some(first) = records.first() else {
                if state.raw_headers.is_none() {
                    return Ok(None);
                }
                let keys = previous_keys(state)
                    .iter()
                    .filter(|k| !k.trim().is_empty())
                    .cloned()
                    .collect();
                return Ok(Some((keys, Vec::new())));
            };
            let keys: Vec<&str> = first.keys().collect();
            if keys.is_empty() {
                return Ok(None);
            }
            check_schema(records, &keys)?;
            let lines = records
                .iter()
                .map(|record| {
                    keys.iter()
                        .map(|k| record.get(k).cloned().unwrap_or(Value::Empty))
                        .collect()
                })
                .collect();
            Ok(Some((keys.into_iter().map(String::from).collect(), lines)))
        }
        Collection::Column { heading, values } => {
            let lines = values.iter().map(|v| vec![v.clone()]).collect();
            Ok(Some((vec![heading.clone()], lines)))
        }
    }
}

/// Column layout: known keys stay at the position they were read from,
/// new keys follow the previous width.
fn layout(keys: &[String], state: &SyncState) -> Vec<Slot> {
    let previous = previous_keys(state);
    let raw = state.raw_headers.as_deref().unwrap_or_default();
    let width = state.width.max(raw.len());
    let mut placed = vec![false; keys.len()];

    let mut slots: Vec<Slot> = (0..width)
        .map(|i| {
            let blank = raw.get(i).is_some_and(|h| h.trim().is_empty());
            if blank {
                return Slot::Keep;
            }
            let found = previous
                .get(i)
                .and_then(|prev| keys.iter().position(|k| k == prev))
                .filter(|&k| !placed[k]);
            match found {
                Some(k) => {
                    placed[k] = true;
                    Slot::Field(k)
                }
                None => Slot::Erase,
            }
        })
        .collect();
    slots.extend((0..keys.len()).filter(|&k| !placed[k]).map(Slot::Field));
    slots
}

/// Encode a collection for writing back over the region of the last read.
///
/// Returns `Ok(None)` when there is nothing to write: an empty collection
/// over a region that held no records, or records without fields.
pub fn encode_collection(
    collection: &Collection,
    state: &SyncState,
    orientation: Orientation,
) -> Result<Option<Encoded>, SyncError> {
    if collection.is_empty() && state.record_count == 0 {
        return Ok(None);
    }
    let Some((keys, values)) = logical_lines(collection, state)? else {
        return Ok(None);
    };

    let slots = layout(&keys, state);
    let mut headings = Vec::with_capacity(slots.len());
    let mut written_keys = Vec::with_capacity(slots.len());
    for slot in &slots {
        match *slot {
            Slot::Field(k) => {
                headings.push(state.raw_heading_for(&keys[k]).to_string());
                written_keys.push(keys[k].clone());
            }
            Slot::Keep | Slot::Erase => {
                headings.push(String::new());
                written_keys.push(String::new());
            }
        }
    }
    let mut seen = HashSet::new();
    let duplicate = slots
        .iter()
        .zip(&headings)
        .filter(|(slot, _)| matches!(slot, Slot::Field(_)))
        .find(|(_, h)| !seen.insert(h.as_str()));
    if let Some((_, dup)) = duplicate {
        return Err(SyncError::schema(format!(
            "more than one field maps to heading {dup:?}"
        )));
    }

    let record_count = values.len();
    let height = record_count.max(state.record_count);

    let header: Vec<WriteCell> = slots
        .iter()
        .zip(&headings)
        .map(|(slot, heading)| match slot {
            Slot::Field(_) => WriteCell::from(heading.as_str()),
            Slot::Keep => WriteCell::Keep,
            Slot::Erase => WriteCell::blank(),
        })
        .collect();
    let mut grid = Vec::with_capacity(height + 1);
    grid.push(header);
    for line in &values {
        grid.push(
            slots
                .iter()
                .map(|slot| match *slot {
                    Slot::Field(k) => to_cell(&line[k]),
                    Slot::Keep => WriteCell::Keep,
                    Slot::Erase => WriteCell::blank(),
                })
                .collect(),
        );
    }
    // Stale lines are cleared across the whole width, blank-headed columns included.
    grid.resize(height + 1, vec![WriteCell::blank(); slots.len()]);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        records = record_count,
        stale_rows = height - record_count,
        erased_columns = slots.iter().filter(|s| **s == Slot::Erase).count(),
        "encoded collection"
    );

    if orientation == Orientation::Columns {
        grid = transpose(grid);
    }

    let mut anchored: WriteGrid = Vec::with_capacity(state.row_offset + grid.len());
    anchored.resize_with(state.row_offset, Vec::new);
    for line in grid {
        let mut row = vec![WriteCell::Keep; state.column_offset];
        row.extend(line);
        anchored.push(row);
    }

    Ok(Some(Encoded {
        grid: anchored,
        record_count,
        headings,
        keys: written_keys,
    }))
}
