//! Per-key cache entries exposed to callers.

use serde::Serialize;

use crate::error::SyncError;

/// Observable state of one cache key.
///
/// ```text
/// Idle ──> Loading ──> Ready
///             │  ▲
///             ▼  │ (next refresh)
///            Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Never fetched.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Last fetch succeeded.
    Ready,
    /// Last fetch failed; `data` still holds the last good value, if any.
    Error,
}

/// Snapshot of one cache key: the last good value plus sync status.
///
/// `data` is never cleared by a failed or in-flight fetch, so callers never
/// see an empty intermediate state once a value has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    /// Most recent failure, cleared by the next successful fetch.
    pub error: Option<SyncError>,
    /// Generation of the latest fetch requested for this key.
    pub request_generation: u64,
}

impl<T> CacheEntry<T> {
    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.is_loading {
            SyncState::Loading
        } else if self.error.is_some() {
            SyncState::Error
        } else if self.data.is_some() {
            SyncState::Ready
        } else {
            SyncState::Idle
        }
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.error.is_some() && self.data.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheEntry<U> {
        CacheEntry {
            data: self.data.map(f),
            is_loading: self.is_loading,
            error: self.error,
            request_generation: self.request_generation,
        }
    }
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
            request_generation: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncErrorKind;

    #[test]
    fn state_follows_fields() {
        let mut entry: CacheEntry<u32> = CacheEntry::default();
        assert_eq!(entry.state(), SyncState::Idle);

        entry.is_loading = true;
        assert_eq!(entry.state(), SyncState::Loading);

        entry.is_loading = false;
        entry.data = Some(1);
        assert_eq!(entry.state(), SyncState::Ready);
        assert!(!entry.is_stale());

        entry.error = Some(SyncError::new(SyncErrorKind::Network, "timeout"));
        assert_eq!(entry.state(), SyncState::Error);
        assert!(entry.is_stale());
    }

    #[test]
    fn map_keeps_status() {
        let entry = CacheEntry {
            data: Some(2u32),
            is_loading: true,
            error: None,
            request_generation: 7,
        };
        let mapped = entry.map(|v| v * 10);
        assert_eq!(mapped.data, Some(20));
        assert!(mapped.is_loading);
        assert_eq!(mapped.request_generation, 7);
    }
}
