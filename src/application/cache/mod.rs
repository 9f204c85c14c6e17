//! Runtime caches used by the sync services.
//!
//! - [`entry::CacheEntry`]: per-key snapshot handed to callers
//! - [`keyed::SyncCache`]: keyed storage with coalescing and generation guards

pub mod entry;
pub mod keyed;

pub use entry::{CacheEntry, SyncState};
pub use keyed::{CacheUpdate, PendingFetch, SyncCache};
