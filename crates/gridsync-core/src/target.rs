use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static SPREADSHEET_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://docs\.google\.com/spreadsheets/(?:u/\d+/)?d/([A-Za-z0-9_-]+)")
        .expect("spreadsheet url regex must compile")
});

static CELL_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?([A-Za-z]*)\$?(\d*)$").expect("cell reference regex must compile")
});

/// Where a session reads and writes: a spreadsheet plus an optional sheet
/// title and A1 range. With neither, the first visible sheet is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

impl SheetTarget {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet: None,
            range: None,
        }
    }

    /// Build a target from a spreadsheet URL (`.../spreadsheets/d/<id>/edit`).
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let caps = SPREADSHEET_URL
            .captures(url.trim())
            .ok_or_else(|| ConfigError::InvalidUrl(url.to_string()))?;
        Ok(Self::new(&caps[1]))
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::MissingSpreadsheet);
        }
        if let Some(range) = &self.range {
            A1Range::parse(range)?;
        }
        Ok(())
    }

    /// Whether the caller pinned the data block with an explicit range.
    pub fn range_provided(&self) -> bool {
        self.range.is_some()
    }

    /// True when neither a sheet title nor a range was configured.
    pub fn needs_sheet_resolution(&self) -> bool {
        self.sheet.is_none() && self.range.is_none()
    }

    pub fn resolve(&self, sheet: Option<String>) -> ResolvedTarget {
        ResolvedTarget {
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheet: self.sheet.clone().or(sheet),
            range: self.range.clone(),
        }
    }
}

/// A target ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub spreadsheet_id: String,
    pub sheet: Option<String>,
    pub range: Option<String>,
}

impl ResolvedTarget {
    /// A1 notation covering the target: `'Sheet'!Range`, `'Sheet'`, or `Range`.
    pub fn a1(&self) -> String {
        match (&self.sheet, &self.range) {
            (Some(sheet), Some(range)) => format!("{}!{range}", quote_sheet(sheet)),
            (Some(sheet), None) => quote_sheet(sheet),
            (None, Some(range)) => range.clone(),
            (None, None) => String::new(),
        }
    }

    pub fn bounds(&self) -> Result<Option<A1Range>, ConfigError> {
        self.range.as_deref().map(A1Range::parse).transpose()
    }
}

fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Zero-based bounds of an A1 range. Open ends (`A:C`, `2:5`) are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct A1Range {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: Option<usize>,
    pub end_col: Option<usize>,
}

impl A1Range {
    /// Parse `B2:D10`, `B2`, `A:C` or `2:5`. A `Sheet!` prefix is ignored.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRange(input.to_string());
        let body = input.rsplit_once('!').map_or(input, |(_, r)| r).trim();
        if body.is_empty() {
            return Err(invalid());
        }

        let (first, second) = match body.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (body, None),
        };
        let (start_col, start_row) = parse_cell_ref(first).ok_or_else(invalid)?;
        let (end_col, end_row) = match second {
            Some(second) => parse_cell_ref(second).ok_or_else(invalid)?,
            None => (start_col, start_row),
        };

        let range = Self {
            start_row: start_row.unwrap_or(0),
            start_col: start_col.unwrap_or(0),
            end_row,
            end_col,
        };
        if range.end_row.is_some_and(|r| r < range.start_row)
            || range.end_col.is_some_and(|c| c < range.start_col)
        {
            return Err(invalid());
        }
        Ok(range)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row
            && col >= self.start_col
            && self.end_row.is_none_or(|r| row <= r)
            && self.end_col.is_none_or(|c| col <= c)
    }
}

/// `(column, row)` zero-based; either may be absent but not both.
fn parse_cell_ref(s: &str) -> Option<(Option<usize>, Option<usize>)> {
    let caps = CELL_REF.captures(s.trim())?;
    let letters = caps.get(1).map_or("", |m| m.as_str());
    let digits = caps.get(2).map_or("", |m| m.as_str());
    if letters.is_empty() && digits.is_empty() {
        return None;
    }

    let col = if letters.is_empty() {
        None
    } else {
        let n = letters.bytes().try_fold(0usize, |acc, b| {
            acc.checked_mul(26)?
                .checked_add((b.to_ascii_uppercase() - b'A') as usize + 1)
        })?;
        Some(n - 1)
    };
    let row = if digits.is_empty() {
        None
    } else {
        let n: usize = digits.parse().ok()?;
        Some(n.checked_sub(1)?)
    };
    Some((col, row))
}
