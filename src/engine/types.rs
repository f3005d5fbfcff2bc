//! Engine types
//!
//! Request parameters and per-request statistics for the sync engine.

/// Parameters of one incremental sync request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// List path relative to the upstream base URL
    pub list: String,
    /// Exclusive lower bound on the modification time
    pub since: Option<String>,
    /// Dot-delimited path exposed as `_updated` on every entity
    pub since_path: Option<String>,
}

impl SyncRequest {
    /// Create a request for a whole list
    pub fn new(list: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            since: None,
            since_path: None,
        }
    }

    /// Only return records modified after `since`
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn with_since(mut self, since: Option<String>) -> Self {
        self.since = since.filter(|s| !s.is_empty());
        self
    }

    /// Expose the value at `path` as `_updated`
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn with_since_path(mut self, path: Option<String>) -> Self {
        self.since_path = path.filter(|p| !p.is_empty());
        self
    }
}

/// Statistics from one request pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Total entities fetched
    pub entities_fetched: usize,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add entities
    pub fn add_entities(&mut self, count: usize) {
        self.entities_fetched += count;
    }
}
