//! Grid ⇄ record transcoding for spreadsheet-backed collections.
//!
//! A [`SyncSession`] reads a sheet region through a [`SheetTransport`],
//! decodes it into a [`Collection`], and writes an edited collection back to
//! the same place, blanking lines and columns that no longer exist.

pub mod cell;
pub mod decode;
pub mod encode;
pub mod error;
pub mod headings;
pub mod memory;
pub mod options;
pub mod record;
pub mod region;
pub mod session;
pub mod state;
pub mod target;
pub mod transport;

pub use cell::decode_cell;
pub use decode::{Decoded, decode_grid};
pub use encode::{Encoded, encode_collection};
pub use error::{ConfigError, Operation, RemoteError, RemoteErrorKind, SyncError};
pub use headings::{Headings, Warning, idify, is_bad_heading, normalize_headings};
pub use memory::MemoryTransport;
pub use options::{Orientation, SyncConfig, SyncOptions};
pub use record::{Collection, Record};
pub use region::{DataRegion, detect_region};
pub use session::{ReadOutcome, SessionPhase, SyncSession, WriteResult, WriteWarning};
pub use state::SyncState;
pub use target::{A1Range, ResolvedTarget, SheetTarget};
pub use transport::{HttpError, SheetInfo, SheetTransport, WriteCell, WriteGrid, WriteRequest};

pub use gridsync_common::{NumberFormatType, RawCell, RawGrid, Scalar, Value};
