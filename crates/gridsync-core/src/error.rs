//! Error taxonomy for the sync engine.
//!
//! - **`SyncError`**   : everything a read or write can fail with
//! - **`RemoteError`** : a transport failure classified for the host
//! - **`ConfigError`** : bad targets or configuration documents
//!
//! Empty sheets and ambiguous headings are not errors: they surface as
//! `ReadOutcome::Empty` and [`Warning`](crate::Warning)s respectively.

use std::fmt;

use thiserror::Error;

use crate::transport::HttpError;

/// Which engine operation a transport failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
}

/// Failure categories the host can report to its users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    Unauthorized,
    PermissionDenied,
    NotFound,
    NoVisibleSheet,
    /// Read-side 400: the sheet title or the range is wrong.
    NoSheetOrInvalidRange,
    InvalidRange,
    RangeTooSmall,
    Protected,
    UnsupportedStructure,
    Other,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unauthorized => "not authorized",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "spreadsheet not found",
            Self::NoVisibleSheet => "spreadsheet has no visible sheet",
            Self::NoSheetOrInvalidRange => "no such sheet or invalid range",
            Self::InvalidRange => "invalid range",
            Self::RangeTooSmall => "range too small for the data",
            Self::Protected => "protected cells",
            Self::UnsupportedStructure => "unsupported data structure",
            Self::Other => "remote error",
        })
    }
}

/// A transport failure, classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (HTTP {status}): {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub status: u16,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Classify a transport error by status code and, for writes, by the
    /// message prefixes the remote store uses for range and value problems.
    pub fn classify(operation: Operation, error: &HttpError) -> Self {
        let message = error.message.as_str();
        let kind = match (error.status, operation) {
            (401, _) => RemoteErrorKind::Unauthorized,
            (403, _) if message.contains("protected cell or object") => RemoteErrorKind::Protected,
            (403, _) => RemoteErrorKind::PermissionDenied,
            (404, _) => RemoteErrorKind::NotFound,
            (400, Operation::Read) => RemoteErrorKind::NoSheetOrInvalidRange,
            (_, Operation::Write) => classify_write_message(message),
            _ => RemoteErrorKind::Other,
        };
        Self::new(kind, error.status, message)
    }
}

fn classify_write_message(message: &str) -> RemoteErrorKind {
    if message.starts_with("Unable to parse range") {
        RemoteErrorKind::InvalidRange
    } else if message.starts_with("Requested writing within range") {
        RemoteErrorKind::RangeTooSmall
    } else if message.contains("protected cell or object") {
        RemoteErrorKind::Protected
    } else if message.starts_with("Invalid values") {
        RemoteErrorKind::UnsupportedStructure
    } else {
        RemoteErrorKind::Other
    }
}

/// Invalid targets or configuration documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{0}` is not a spreadsheet URL")]
    InvalidUrl(String),
    #[error("spreadsheet id must not be empty")]
    MissingSpreadsheet,
    #[error("invalid A1 range `{0}`")]
    InvalidRange(String),
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote store unavailable: {0}")]
    Remote(#[from] RemoteError),
    #[error("records do not match a consistent heading line: {reason}")]
    SchemaMismatch { reason: String },
    #[error("write attempted before a read completed")]
    NotLoaded,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SyncError {
    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        SyncError::SchemaMismatch {
            reason: reason.into(),
        }
    }
}
