use gridsync_common::RawGrid;

/// What the session remembers between a read and the writes that follow.
///
/// Offsets are in raw grid coordinates whatever the orientation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncState {
    pub last_grid: Option<RawGrid>,
    pub record_count: usize,
    pub row_offset: usize,
    pub column_offset: usize,
    pub raw_headers: Option<Vec<String>>,
    pub normalized_headers: Option<Vec<String>>,
    /// Heading count of the last read or write.
    pub width: usize,
}

impl SyncState {
    /// The raw heading a record key was read from. Unknown keys map to themselves.
    pub fn raw_heading_for<'a>(&'a self, key: &'a str) -> &'a str {
        let (Some(raw), Some(normalized)) = (&self.raw_headers, &self.normalized_headers) else {
            return key;
        };
        normalized
            .iter()
            .position(|n| n == key)
            .and_then(|i| raw.get(i))
            .map_or(key, String::as_str)
    }
}
