use std::fmt;

use gridsync_common::RawGrid;

use crate::decode::{Decoded, decode_grid};
use crate::encode::{Encoded, encode_collection};
use crate::error::{Operation, RemoteError, RemoteErrorKind, SyncError};
use crate::options::{Orientation, SyncConfig, SyncOptions};
use crate::record::Collection;
use crate::state::SyncState;
use crate::target::{ResolvedTarget, SheetTarget};
use crate::transport::{HttpError, SheetTransport, WriteGrid, WriteRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Loaded,
    Empty,
    Written,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The sheet (or range) holds no data.
    Empty,
    Loaded(Decoded),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteWarning {
    /// The configured sheet did not exist and was created before writing.
    SheetCreated { title: String },
}

impl fmt::Display for WriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteWarning::SheetCreated { title } => write!(f, "created missing sheet {title:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteResult {
    pub accepted: bool,
    pub updated_record_count: usize,
    pub warnings: Vec<WriteWarning>,
    pub failure: Option<RemoteError>,
}

impl WriteResult {
    fn rejected(failure: RemoteError, warnings: Vec<WriteWarning>) -> Self {
        Self {
            accepted: false,
            updated_record_count: 0,
            warnings,
            failure: Some(failure),
        }
    }
}

/// One synchronized region: reads decode it, writes put records back where
/// they were read from.
///
/// Operations take `&mut self`, so a session never has two in flight.
/// `SyncState` only changes once every transport call of an operation has
/// succeeded.
#[derive(Debug)]
pub struct SyncSession<T> {
    transport: T,
    target: SheetTarget,
    options: SyncOptions,
    state: SyncState,
    phase: SessionPhase,
    resolved_sheet: Option<String>,
}

impl<T: SheetTransport> SyncSession<T> {
    pub fn new(transport: T, target: SheetTarget, options: SyncOptions) -> Self {
        Self {
            transport,
            target,
            options,
            state: SyncState::default(),
            phase: SessionPhase::Idle,
            resolved_sheet: None,
        }
    }

    pub fn from_config(transport: T, config: SyncConfig) -> Result<Self, SyncError> {
        config.target.validate()?;
        Ok(Self::new(transport, config.target, config.options))
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn target(&self) -> &SheetTarget {
        &self.target
    }

    /// The sheet picked when neither a sheet nor a range was configured.
    pub fn resolved_sheet(&self) -> Option<&str> {
        self.resolved_sheet.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn resolve_target(&mut self, operation: Operation) -> Result<ResolvedTarget, RemoteError> {
        if !self.target.needs_sheet_resolution() || self.resolved_sheet.is_some() {
            return Ok(self.target.resolve(self.resolved_sheet.clone()));
        }

        let sheets = self
            .transport
            .fetch_sheet_list(&self.target.spreadsheet_id)
            .map_err(|e| RemoteError::classify(operation, &e))?;
        let Some(first) = sheets.into_iter().find(|s| !s.hidden) else {
            return Err(RemoteError::new(
                RemoteErrorKind::NoVisibleSheet,
                404,
                format!("spreadsheet {} has no visible sheet", self.target.spreadsheet_id),
            ));
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(sheet = %first.title, "resolved first visible sheet");

        self.resolved_sheet = Some(first.title);
        Ok(self.target.resolve(self.resolved_sheet.clone()))
    }

    /// Fetch and decode the target region.
    pub fn read(&mut self) -> Result<ReadOutcome, SyncError> {
        let target = self.resolve_target(Operation::Read)?;
        let grid = self
            .transport
            .fetch_grid(&target)
            .map_err(|e| RemoteError::classify(Operation::Read, &e))?;

        match decode_grid(&grid, &self.options, self.target.range_provided())? {
            None => {
                self.state = SyncState {
                    last_grid: Some(grid),
                    ..SyncState::default()
                };
                self.phase = SessionPhase::Empty;
                Ok(ReadOutcome::Empty)
            }
            Some(decoded) => {
                self.state = decoded.state.clone();
                self.phase = SessionPhase::Loaded;
                Ok(ReadOutcome::Loaded(decoded))
            }
        }
    }

    fn send(&mut self, target: &ResolvedTarget, grid: &WriteGrid) -> Result<RawGrid, HttpError> {
        self.transport.write_grid(&WriteRequest {
            target,
            grid,
            orientation: Orientation::Rows,
            render_formatted: self.options.render_formatted,
        })
    }

    /// Create `title` if the spreadsheet lacks it. `Ok(false)` means it exists.
    fn create_missing_sheet(&mut self, title: &str) -> Result<bool, HttpError> {
        let id = self.target.spreadsheet_id.clone();
        let sheets = self.transport.fetch_sheet_list(&id)?;
        if sheets.iter().any(|s| s.title == title) {
            return Ok(false);
        }
        self.transport.create_sheet(&id, title)?;

        #[cfg(feature = "tracing")]
        tracing::warn!(sheet = %title, "created missing sheet before writing");

        Ok(true)
    }

    /// Encode `collection` and write it over the region of the last read.
    ///
    /// Remote failures are reported in the result rather than as `Err`, so
    /// the host can keep its records and retry later.
    pub fn write(&mut self, collection: &Collection) -> Result<WriteResult, SyncError> {
        if self.phase == SessionPhase::Idle {
            return Err(SyncError::NotLoaded);
        }

        let Some(encoded) = encode_collection(collection, &self.state, self.options.orientation)? else {
            self.phase = SessionPhase::Written;
            return Ok(WriteResult {
                accepted: true,
                updated_record_count: 0,
                warnings: Vec::new(),
                failure: None,
            });
        };

        let target = match self.resolve_target(Operation::Write) {
            Ok(target) => target,
            Err(failure) => return Ok(WriteResult::rejected(failure, Vec::new())),
        };

        let mut warnings = Vec::new();
        let echo = match self.send(&target, &encoded.grid) {
            Ok(echo) => echo,
            Err(err) => {
                let recovered = match self.target.sheet.clone() {
                    Some(title) if err.status == 400 => match self.create_missing_sheet(&title) {
                        Ok(true) => {
                            warnings.push(WriteWarning::SheetCreated { title });
                            Some(self.send(&target, &encoded.grid))
                        }
                        Ok(false) => None,
                        Err(create_err) => Some(Err(create_err)),
                    },
                    _ => None,
                };
                match recovered {
                    Some(Ok(echo)) => echo,
                    Some(Err(retry_err)) => {
                        let failure = RemoteError::classify(Operation::Write, &retry_err);
                        return Ok(WriteResult::rejected(failure, warnings));
                    }
                    None => {
                        let failure = RemoteError::classify(Operation::Write, &err);
                        return Ok(WriteResult::rejected(failure, warnings));
                    }
                }
            }
        };

        // Trailing erased columns fall outside the region a fresh read would find.
        let Encoded {
            mut headings,
            mut keys,
            record_count,
            ..
        } = encoded;
        let width = headings
            .iter()
            .rposition(|h| !h.trim().is_empty())
            .map_or(0, |last| last + 1);
        headings.truncate(width);
        keys.truncate(width);

        let normalized = self.state.normalized_headers.is_some().then_some(keys);
        self.state.record_count = record_count;
        self.state.width = width;
        self.state.raw_headers = Some(headings);
        self.state.normalized_headers = normalized;
        self.state.last_grid = Some(echo);
        self.phase = SessionPhase::Written;

        Ok(WriteResult {
            accepted: true,
            updated_record_count: record_count,
            warnings,
            failure: None,
        })
    }
}
