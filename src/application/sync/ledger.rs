//! Prediction ledger synchronization.
//!
//! Syncs a user's historical predictions from the indexer. Every successful
//! fetch replaces the cached list as a whole, so resyncing never appends or
//! merges records and an unchanged indexer answer leaves an equal list.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::application::cache::{CacheEntry, CacheUpdate, PendingFetch, SyncCache};
use crate::domain::{PositionBook, PredictionRecord, UserId};
use crate::error::SyncError;
use crate::port::outbound::ledger::PredictionIndexer;

/// Caches each user's prediction records, one independent entry per user.
pub struct PredictionLedgerSync {
    indexer: Arc<dyn PredictionIndexer>,
    cache: Arc<SyncCache<UserId, Vec<PredictionRecord>>>,
}

impl PredictionLedgerSync {
    pub fn new(indexer: Arc<dyn PredictionIndexer>, update_channel_capacity: usize) -> Self {
        Self {
            indexer,
            cache: Arc::new(SyncCache::new("predictions", update_channel_capacity)),
        }
    }

    /// Current entry for `user_id`.
    ///
    /// The first call for a user starts the initial fetch and returns the
    /// entry in its loading state.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn positions(&self, user_id: &UserId) -> CacheEntry<Vec<PredictionRecord>> {
        if !self.cache.contains(user_id) {
            debug!(user_id = %user_id, "First observation, starting initial sync");
            // Runs detached; the entry reports progress
            drop(self.dispatch(user_id));
        }
        self.cache.entry(user_id)
    }

    /// Refetch the full record set for `user_id` and return the entry once
    /// the fetch has resolved. Joins a resync already in flight.
    pub async fn resync(&self, user_id: &UserId) -> CacheEntry<Vec<PredictionRecord>> {
        self.dispatch(user_id).await;
        self.cache.entry(user_id)
    }

    /// Records of `user_id` classified into open and closed positions.
    ///
    /// Empty until the first sync succeeds.
    #[must_use]
    pub fn position_book(&self, user_id: &UserId) -> PositionBook {
        self.cache
            .entry(user_id)
            .data
            .map(|records| PositionBook::from_records(&records))
            .unwrap_or_default()
    }

    /// Stop caring about an in-flight sync for `user_id`, for example after
    /// a wallet switch. Its response will be discarded.
    pub fn forget(&self, user_id: &UserId) {
        self.cache.abandon(user_id);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheUpdate<UserId>> {
        self.cache.subscribe()
    }

    fn dispatch(&self, user_id: &UserId) -> PendingFetch {
        let indexer = Arc::clone(&self.indexer);
        let id = user_id.clone();
        self.cache.dispatch(user_id, move || async move {
            let records = indexer.fetch_predictions(&id).await.map_err(SyncError::from)?;
            debug!(user_id = %id, count = records.len(), "Fetched predictions");
            Ok(records)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache::SyncState;
    use crate::domain::{Outcome, PredictionStatus};
    use crate::testkit::domain::prediction;
    use crate::testkit::ledger::ScriptedIndexer;

    #[tokio::test]
    async fn first_observation_starts_loading() {
        let indexer = Arc::new(ScriptedIndexer::new());
        let user = UserId::new("aleo1user");
        indexer.set_records(&user, vec![prediction("1", Outcome::Yes, PredictionStatus::Active)]);
        let sync = PredictionLedgerSync::new(indexer.clone(), 16);

        let entry = sync.positions(&user);
        assert_eq!(entry.state(), SyncState::Loading);

        let entry = sync.resync(&user).await;
        assert_eq!(entry.data.unwrap().len(), 1);
        assert_eq!(indexer.calls(&user), 1);
    }

    #[tokio::test]
    async fn position_book_classifies_records() {
        let indexer = Arc::new(ScriptedIndexer::new());
        let user = UserId::new("aleo1user");
        indexer.set_records(
            &user,
            vec![
                prediction("1", Outcome::Yes, PredictionStatus::Active),
                prediction("2", Outcome::No, PredictionStatus::Won),
            ],
        );
        let sync = PredictionLedgerSync::new(indexer, 16);

        assert!(sync.position_book(&user).is_empty());
        sync.resync(&user).await;

        let book = sync.position_book(&user);
        assert_eq!(book.active().len(), 1);
        assert_eq!(book.closed().len(), 1);
    }
}
