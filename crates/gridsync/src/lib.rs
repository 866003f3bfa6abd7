//! Meta crate that re-exports the gridsync layers with sensible defaults.
//! The transcoding engine is always available; the Google Sheets transport
//! sits behind the `sheets` feature so hosts with their own HTTP stack can
//! implement [`SheetTransport`] themselves.

pub use gridsync_common as common;
pub use gridsync_core as engine;

#[cfg(feature = "sheets")]
pub use gridsync_sheets as sheets;

pub use gridsync_core::{
    Collection, ConfigError, HttpError, MemoryTransport, Orientation, ReadOutcome, Record,
    RemoteError, RemoteErrorKind, SheetTarget, SheetTransport, SyncConfig, SyncError, SyncOptions,
    SyncSession, Value, Warning, WriteResult, WriteWarning,
};

#[cfg(feature = "sheets")]
pub use gridsync_sheets::{SheetsClient, SheetsClientConfig};
