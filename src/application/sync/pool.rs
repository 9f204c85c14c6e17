//! Pool synchronization service.
//!
//! Keeps one cache entry per observed market, refreshed by polling the
//! pool read API at a fixed interval.
//!
//! # Lifecycle
//!
//! ```text
//! observe(M) ──> poller started, first tick fetches immediately
//!     │
//!     ├── every poll_interval: dispatch fetch (coalesced with refresh())
//!     │
//! drop last PoolWatch for M ──> poller aborted, generation advanced
//! ```
//!
//! Snapshots that fail validation are treated as failed fetches: the
//! entry's `error` is set and the previous good pool is kept.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::application::cache::{CacheEntry, CacheUpdate, PendingFetch, SyncCache};
use crate::domain::{DomainError, MarketFallback, MarketId, MarketView, StakePool};
use crate::error::SyncError;
use crate::port::outbound::ledger::PoolReader;

/// Configuration for the pool sync service.
#[derive(Debug, Clone)]
pub struct PoolSyncConfig {
    /// Fixed interval between polls of an observed market.
    pub poll_interval: Duration,
    /// Capacity of the update broadcast channel.
    pub update_channel_capacity: usize,
}

impl Default for PoolSyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            update_channel_capacity: 256,
        }
    }
}

struct Observed {
    observers: usize,
    fallback: MarketFallback,
    poller: JoinHandle<()>,
}

struct PoolSyncInner {
    reader: Arc<dyn PoolReader>,
    cache: Arc<SyncCache<MarketId, StakePool>>,
    config: PoolSyncConfig,
    observed: Mutex<HashMap<MarketId, Observed>>,
}

impl PoolSyncInner {
    fn dispatch(&self, market_id: &MarketId) -> PendingFetch {
        let reader = Arc::clone(&self.reader);
        let id = market_id.clone();
        self.cache.dispatch(market_id, move || async move {
            let reading = reader.fetch_pool(&id).await?;
            if reading.market_id != id {
                return Err(SyncError::from(DomainError::inconsistent(
                    &id,
                    format!("response is for market {}", reading.market_id),
                )));
            }
            Ok(StakePool::try_from(reading)?)
        })
    }

    fn release(&self, market_id: &MarketId) {
        let mut observed = self.observed.lock();
        let Entry::Occupied(mut slot) = observed.entry(market_id.clone()) else {
            return;
        };

        slot.get_mut().observers -= 1;
        if slot.get().observers > 0 {
            return;
        }

        let Observed { poller, .. } = slot.remove();
        drop(observed);
        poller.abort();
        self.cache.abandon(market_id);
        info!(market_id = %market_id, "Stopped polling pool");
    }
}

/// Polls and caches stake pools for observed markets.
pub struct PoolSyncService {
    inner: Arc<PoolSyncInner>,
}

impl PoolSyncService {
    pub fn new(reader: Arc<dyn PoolReader>, config: PoolSyncConfig) -> Self {
        let cache = Arc::new(SyncCache::new("pool", config.update_channel_capacity));
        Self {
            inner: Arc::new(PoolSyncInner {
                reader,
                cache,
                config,
                observed: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start observing `market_id`.
    ///
    /// The first observer starts the poller, whose first tick fetches
    /// immediately. Later observers share it and replace the fallback.
    /// Polling stops when the last returned [`PoolWatch`] is dropped.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn observe(&self, market_id: MarketId, fallback: MarketFallback) -> PoolWatch {
        let mut observed = self.inner.observed.lock();
        match observed.entry(market_id.clone()) {
            Entry::Occupied(mut slot) => {
                let slot = slot.get_mut();
                slot.observers += 1;
                slot.fallback = fallback;
            }
            Entry::Vacant(slot) => {
                let poller = spawn_poller(
                    Arc::downgrade(&self.inner),
                    market_id.clone(),
                    self.inner.config.poll_interval,
                );
                info!(
                    market_id = %market_id,
                    interval_ms = self.inner.config.poll_interval.as_millis() as u64,
                    source = self.inner.reader.source_name(),
                    "Started polling pool"
                );
                slot.insert(Observed {
                    observers: 1,
                    fallback,
                    poller,
                });
            }
        }
        drop(observed);

        PoolWatch {
            inner: Arc::clone(&self.inner),
            market_id,
        }
    }

    /// Current cache entry for `market_id`. Unknown markets are idle.
    #[must_use]
    pub fn get_pool(&self, market_id: &MarketId) -> CacheEntry<StakePool> {
        self.inner.cache.entry(market_id)
    }

    /// Fetch `market_id` now, or join the fetch already in flight, and
    /// return the entry once it has resolved.
    pub async fn refresh(&self, market_id: &MarketId) -> CacheEntry<StakePool> {
        self.inner.dispatch(market_id).await;
        self.get_pool(market_id)
    }

    /// Drop any in-flight fetch for `market_id` and start a new one.
    ///
    /// The old response is discarded when it arrives.
    pub async fn invalidate(&self, market_id: &MarketId) -> CacheEntry<StakePool> {
        self.inner.cache.abandon(market_id);
        self.refresh(market_id).await
    }

    /// The market merged with its fallback data.
    ///
    /// Unobserved markets use the default fallback.
    #[must_use]
    pub fn market_view(&self, market_id: &MarketId) -> MarketView {
        let fallback = self
            .inner
            .observed
            .lock()
            .get(market_id)
            .map(|slot| slot.fallback.clone())
            .unwrap_or_default();
        let entry = self.get_pool(market_id);
        MarketView::merge(market_id.clone(), &fallback, entry.data.as_ref())
    }

    #[must_use]
    pub fn is_observed(&self, market_id: &MarketId) -> bool {
        self.inner.observed.lock().contains_key(market_id)
    }

    /// Number of markets currently being polled.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.inner.observed.lock().len()
    }

    /// Subscribe to pool entry changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheUpdate<MarketId>> {
        self.inner.cache.subscribe()
    }
}

impl Drop for PoolSyncService {
    fn drop(&mut self) {
        for (market_id, slot) in self.inner.observed.lock().drain() {
            slot.poller.abort();
            debug!(market_id = %market_id, "Poller aborted on shutdown");
        }
    }
}

/// Observation handle for one market. Dropping it ends the observation.
pub struct PoolWatch {
    inner: Arc<PoolSyncInner>,
    market_id: MarketId,
}

impl PoolWatch {
    #[must_use]
    pub fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub fn get(&self) -> CacheEntry<StakePool> {
        self.inner.cache.entry(&self.market_id)
    }

    pub async fn refresh(&self) -> CacheEntry<StakePool> {
        self.inner.dispatch(&self.market_id).await;
        self.get()
    }
}

impl Drop for PoolWatch {
    fn drop(&mut self) {
        self.inner.release(&self.market_id);
    }
}

fn spawn_poller(inner: Weak<PoolSyncInner>, market_id: MarketId, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(inner) = inner.upgrade() else {
                break;
            };
            let pending = inner.dispatch(&market_id);
            drop(inner);
            pending.await;
        }
    })
}
