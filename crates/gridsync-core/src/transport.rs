//! The seam between the engine and whatever moves grids over the wire.

use gridsync_common::{RawGrid, Scalar};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::options::Orientation;
use crate::target::ResolvedTarget;

/// A failed remote call: the HTTP status and the server's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {message}")]
pub struct HttpError {
    pub status: u16,
    pub message: String,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub title: String,
    pub hidden: bool,
}

impl SheetInfo {
    pub fn visible(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            hidden: false,
        }
    }

    pub fn hidden(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            hidden: true,
        }
    }
}

/// One cell of an outgoing grid. `Keep` leaves the remote cell untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WriteCell {
    #[default]
    Keep,
    Set(Scalar),
}

impl WriteCell {
    pub fn blank() -> Self {
        WriteCell::Set(Scalar::Text(String::new()))
    }
}

impl Serialize for WriteCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WriteCell::Keep => serializer.serialize_none(),
            WriteCell::Set(value) => value.serialize(serializer),
        }
    }
}

impl From<Scalar> for WriteCell {
    fn from(value: Scalar) -> Self {
        WriteCell::Set(value)
    }
}

impl From<&str> for WriteCell {
    fn from(value: &str) -> Self {
        WriteCell::Set(Scalar::from(value))
    }
}

impl From<f64> for WriteCell {
    fn from(value: f64) -> Self {
        WriteCell::Set(Scalar::Number(value))
    }
}

pub type WriteGrid = Vec<Vec<WriteCell>>;

#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    pub target: &'a ResolvedTarget,
    pub grid: &'a WriteGrid,
    /// Major dimension of `grid`.
    pub orientation: Orientation,
    pub render_formatted: bool,
}

/// Remote tabular store. Implementations own authentication, timeouts and
/// the wire format; they only report failures as [`HttpError`].
pub trait SheetTransport {
    fn fetch_grid(&mut self, target: &ResolvedTarget) -> Result<RawGrid, HttpError>;

    fn fetch_sheet_list(&mut self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, HttpError>;

    /// Write `request.grid` and return the values the store now holds there.
    fn write_grid(&mut self, request: &WriteRequest<'_>) -> Result<RawGrid, HttpError>;

    fn create_sheet(&mut self, spreadsheet_id: &str, title: &str) -> Result<(), HttpError>;
}

impl<T: SheetTransport + ?Sized> SheetTransport for &mut T {
    fn fetch_grid(&mut self, target: &ResolvedTarget) -> Result<RawGrid, HttpError> {
        (**self).fetch_grid(target)
    }

    fn fetch_sheet_list(&mut self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>, HttpError> {
        (**self).fetch_sheet_list(spreadsheet_id)
    }

    fn write_grid(&mut self, request: &WriteRequest<'_>) -> Result<RawGrid, HttpError> {
        (**self).write_grid(request)
    }

    fn create_sheet(&mut self, spreadsheet_id: &str, title: &str) -> Result<(), HttpError> {
        (**self).create_sheet(spreadsheet_id, title)
    }
}
