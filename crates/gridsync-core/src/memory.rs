//! In-process [`SheetTransport`] for tests and offline hosts.
//!
//! Cells live in a sparse map per sheet. Writes follow the remote store's
//! rules closely enough to exercise the engine: `null` cells are skipped,
//! blank text clears a cell, user-entered text is re-parsed into numbers,
//! booleans and ISO dates, and writes outside a bounded range are refused.

use std::collections::{BTreeMap, VecDeque};

use chrono::{NaiveDate, NaiveDateTime};
use gridsync_common::{NumberFormatType, RawCell, RawGrid, Scalar, date_to_serial, datetime_to_serial};

use crate::options::Orientation;
use crate::target::{A1Range, ResolvedTarget};
use crate::transport::{HttpError, SheetInfo, SheetTransport, WriteCell, WriteRequest};

/// A transport call, as recorded by [`MemoryTransport::calls`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchGrid { a1: String },
    FetchSheetList,
    WriteGrid { a1: String },
    CreateSheet { title: String },
}

#[derive(Debug, Clone, Default)]
struct MemorySheet {
    title: String,
    hidden: bool,
    cells: BTreeMap<(usize, usize), RawCell>,
}

impl MemorySheet {
    fn new(title: &str, hidden: bool, grid: RawGrid) -> Self {
        let cells = grid
            .into_iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .filter(|(_, cell)| !cell.is_empty())
                    .map(move |(c, cell)| ((r, c), cell))
            })
            .collect();
        Self {
            title: title.to_string(),
            hidden,
            cells,
        }
    }

    /// Cells inside `bounds`, relative to its top-left corner.
    fn grid_within(&self, bounds: Option<&A1Range>) -> RawGrid {
        let (top, left) = bounds.map_or((0, 0), |b| (b.start_row, b.start_col));
        let mut grid: RawGrid = Vec::new();
        for (&(r, c), cell) in &self.cells {
            if bounds.is_some_and(|b| !b.contains(r, c)) {
                continue;
            }
            let (r, c) = (r - top, c - left);
            if grid.len() <= r {
                grid.resize_with(r + 1, Vec::new);
            }
            let row = &mut grid[r];
            if row.len() <= c {
                row.resize_with(c + 1, RawCell::empty);
            }
            row[c] = cell.clone();
        }
        grid
    }
}

/// A single spreadsheet held in memory.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    spreadsheet_id: String,
    sheets: Vec<MemorySheet>,
    calls: Vec<Call>,
    failures: VecDeque<HttpError>,
}

impl MemoryTransport {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheets: Vec::new(),
            calls: Vec::new(),
            failures: VecDeque::new(),
        }
    }

    pub fn with_sheet(mut self, title: &str, grid: RawGrid) -> Self {
        self.sheets.push(MemorySheet::new(title, false, grid));
        self
    }

    pub fn with_hidden_sheet(mut self, title: &str, grid: RawGrid) -> Self {
        self.sheets.push(MemorySheet::new(title, true, grid));
        self
    }

    /// Drop a sheet, as if another editor deleted it.
    pub fn remove_sheet(&mut self, title: &str) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|s| s.title != title);
        self.sheets.len() != before
    }

    /// Make the next call fail with `error`. Queued failures fire in order.
    pub fn inject_failure(&mut self, error: HttpError) {
        self.failures.push_back(error);
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The whole sheet as a dense-from-origin grid.
    pub fn sheet_grid(&self, title: &str) -> Option<RawGrid> {
        self.sheets
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.grid_within(None))
    }

    fn record(&mut self, call: Call) -> Result<(), HttpError> {
        self.calls.push(call);
        self.failures.pop_front().map_or(Ok(()), Err)
    }

    fn check_spreadsheet(&self, spreadsheet_id: &str) -> Result<(), HttpError> {
        if spreadsheet_id == self.spreadsheet_id {
            Ok(())
        } else {
            Err(HttpError::new(404, "Requested entity was not found."))
        }
    }

    fn locate(&self, target: &ResolvedTarget) -> Result<(usize, Option<A1Range>), HttpError> {
        self.check_spreadsheet(&target.spreadsheet_id)?;
        let unparsable = || HttpError::new(400, format!("Unable to parse range: {}", target.a1()));

        let prefixed = target
            .range
            .as_deref()
            .and_then(|r| r.rsplit_once('!'))
            .map(|(sheet, _)| unquote(sheet));
        let index = match target.sheet.clone().or(prefixed) {
            Some(title) => self.sheets.iter().position(|s| s.title == title),
            None => (!self.sheets.is_empty()).then_some(0),
        }
        .ok_or_else(unparsable)?;
        let bounds = target.bounds().map_err(|_| unparsable())?;
        Ok((index, bounds))
    }
}

fn unquote(sheet: &str) -> String {
    let sheet = sheet.trim();
    match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => sheet.to_string(),
    }
}

/// Store a user-entered scalar the way a spreadsheet would parse it.
fn entered_cell(value: &Scalar) -> RawCell {
    let Scalar::Text(text) = value else {
        return RawCell::from_scalar(value.clone());
    };
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return RawCell::temporal(date_to_serial(&date), NumberFormatType::Date, trimmed);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return RawCell::temporal(datetime_to_serial(&dt), NumberFormatType::DateTime, trimmed);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return RawCell::from_scalar(Scalar::Number(n)).with_formatted(trimmed);
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "TRUE" => RawCell::from_scalar(Scalar::Boolean(true)),
        "FALSE" => RawCell::from_scalar(Scalar::Boolean(false)),
        _ => RawCell::from_scalar(value.clone()),
    }
}

impl SheetTransport for MemoryTransport {
    fn fetch_grid(&mut self, target: &ResolvedTarget) -> Result<RawGrid, HttpError> {
        self.record(Call::FetchGrid { a1: target.a1() })?;
        let (index, bounds) = self.locate(target)?;
        Ok(self.sheets[index].grid_within(bounds.as_ref()))
    }

    fn fetch_sheet_list(&mut self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, HttpError> {
        self.record(Call::FetchSheetList)?;
        self.check_spreadsheet(spreadsheet_id)?;
        Ok(self
            .sheets
            .iter()
            .map(|s| SheetInfo {
                title: s.title.clone(),
                hidden: s.hidden,
            })
            .collect())
    }

    fn write_grid(&mut self, request: &WriteRequest<'_>) -> Result<RawGrid, HttpError> {
        let a1 = request.target.a1();
        self.record(Call::WriteGrid { a1: a1.clone() })?;
        let (index, bounds) = self.locate(request.target)?;
        let (top, left) = bounds.map_or((0, 0), |b| (b.start_row, b.start_col));

        let mut updates = Vec::new();
        for (i, line) in request.grid.iter().enumerate() {
            for (j, cell) in line.iter().enumerate() {
                let (dr, dc) = match request.orientation {
                    Orientation::Rows => (i, j),
                    Orientation::Columns => (j, i),
                };
                let (r, c) = (top + dr, left + dc);
                if let Some(b) = &bounds {
                    if b.end_row.is_some_and(|end| r > end) {
                        return Err(HttpError::new(
                            400,
                            format!("Requested writing within range [{a1}], but tried writing to row [{}]", r + 1),
                        ));
                    }
                    if b.end_col.is_some_and(|end| c > end) {
                        return Err(HttpError::new(
                            400,
                            format!("Requested writing within range [{a1}], but tried writing to column [{}]", c + 1),
                        ));
                    }
                }
                if let WriteCell::Set(value) = cell {
                    updates.push(((r, c), value));
                }
            }
        }

        let sheet = &mut self.sheets[index];
        let (mut rows, mut cols) = (0, 0);
        for ((r, c), value) in updates {
            rows = rows.max(r - top + 1);
            cols = cols.max(c - left + 1);
            if value.is_blank_text() {
                sheet.cells.remove(&(r, c));
            } else {
                sheet.cells.insert((r, c), entered_cell(value));
            }
        }

        Ok((0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| sheet.cells.get(&(top + r, left + c)).cloned().unwrap_or_default())
                    .collect()
            })
            .collect())
    }

    fn create_sheet(&mut self, spreadsheet_id: &str, title: &str) -> Result<(), HttpError> {
        self.record(Call::CreateSheet {
            title: title.to_string(),
        })?;
        self.check_spreadsheet(spreadsheet_id)?;
        if self.sheets.iter().any(|s| s.title == title) {
            return Err(HttpError::new(
                400,
                format!("A sheet with the name \"{title}\" already exists. Please enter another name."),
            ));
        }
        self.sheets.push(MemorySheet::new(title, false, Vec::new()));
        Ok(())
    }
}
