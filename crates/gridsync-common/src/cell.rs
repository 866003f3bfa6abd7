use crate::value::{NumberFormatType, Scalar};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One cell as returned by the remote store.
///
/// An absent `effective` value means the cell is empty, whatever `formatted` says.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCell {
    pub effective: Option<Scalar>,
    pub formatted: String,
    pub number_format: NumberFormatType,
}

/// Row-major grid of raw cells. Rows may be ragged; missing cells are empty.
pub type RawGrid = Vec<Vec<RawCell>>;

impl RawCell {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A cell whose formatted text is the scalar's display form.
    pub fn from_scalar(value: Scalar) -> Self {
        Self {
            formatted: value.to_string(),
            effective: Some(value),
            number_format: NumberFormatType::None,
        }
    }

    /// A date-kind cell holding `serial`, displayed as `formatted`.
    pub fn temporal(serial: f64, format: NumberFormatType, formatted: impl Into<String>) -> Self {
        Self {
            effective: Some(Scalar::Number(serial)),
            formatted: formatted.into(),
            number_format: format,
        }
    }

    pub fn with_formatted(mut self, formatted: impl Into<String>) -> Self {
        self.formatted = formatted.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.effective.is_none()
    }

    /// Text used when this cell serves as a heading.
    pub fn heading_text(&self) -> String {
        match &self.effective {
            None => String::new(),
            Some(_) if !self.formatted.is_empty() => self.formatted.clone(),
            Some(value) => value.to_string(),
        }
    }
}

impl From<Scalar> for RawCell {
    fn from(value: Scalar) -> Self {
        RawCell::from_scalar(value)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            RawCell::empty()
        } else {
            RawCell::from_scalar(Scalar::from(value))
        }
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::from_scalar(Scalar::Number(value))
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        RawCell::from_scalar(Scalar::Number(value as f64))
    }
}

impl From<bool> for RawCell {
    fn from(value: bool) -> Self {
        RawCell::from_scalar(Scalar::Boolean(value))
    }
}

/// Cell at `(row, col)`, treating anything past a ragged row's end as empty.
pub fn cell_at(grid: &[Vec<RawCell>], row: usize, col: usize) -> Option<&RawCell> {
    grid.get(row)
        .and_then(|r| r.get(col))
        .filter(|cell| !cell.is_empty())
}

/// Build a grid from scalars, mapping blank text to empty cells.
pub fn grid_from_scalars(rows: Vec<Vec<Scalar>>) -> RawGrid {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| {
                    if value.is_blank_text() {
                        RawCell::empty()
                    } else {
                        RawCell::from_scalar(value)
                    }
                })
                .collect()
        })
        .collect()
}
