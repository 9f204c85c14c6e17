//! Keyed cache with request coalescing and a staleness guard.
//!
//! Every key owns an independent slot holding its [`CacheEntry`], the
//! generation counter and at most one in-flight fetch:
//!
//! - [`SyncCache::dispatch`] while a fetch is in flight returns the pending
//!   fetch instead of starting another one.
//! - A fetch is tagged with the key's generation when dispatched. If the
//!   generation has moved on by the time it resolves (see
//!   [`SyncCache::abandon`]), the response is dropped without touching the
//!   entry.
//! - A successful response replaces `data` wholesale and clears `error`.
//!   A failed one sets `error` and leaves `data` as it was.
//!
//! Fetches run on their own task. Abandoning a key does not cancel the
//! transport request; its result is simply ignored. A fetch that panics is
//! recorded as a network error so the key can be fetched again.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use super::entry::{CacheEntry, SyncState};
use crate::error::{SyncError, SyncErrorKind};

/// Handle on an in-flight fetch. Resolves once the fetch has been applied
/// to (or discarded from) the cache. Cloning shares the same fetch.
pub type PendingFetch = Shared<BoxFuture<'static, ()>>;

/// Notification sent whenever a key's state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheUpdate<K> {
    pub key: K,
    pub state: SyncState,
    pub generation: u64,
}

struct Slot<T> {
    entry: CacheEntry<T>,
    in_flight: Option<PendingFetch>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            entry: CacheEntry::default(),
            in_flight: None,
        }
    }
}

/// Thread-safe map of independently synced cache entries.
pub struct SyncCache<K, T> {
    /// Label used in logs.
    name: &'static str,
    slots: Mutex<HashMap<K, Slot<T>>>,
    tx: broadcast::Sender<CacheUpdate<K>>,
}

impl<K, T> SyncCache<K, T>
where
    K: Clone + Eq + Hash + Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty cache. `capacity` bounds the update channel.
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            name,
            slots: Mutex::new(HashMap::new()),
            tx,
        }
    }

    /// Subscribe to state change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheUpdate<K>> {
        self.tx.subscribe()
    }

    /// Snapshot of `key`'s entry. Unknown keys are `Idle`.
    #[must_use]
    pub fn entry(&self, key: &K) -> CacheEntry<T> {
        self.slots
            .lock()
            .get(key)
            .map(|slot| slot.entry.clone())
            .unwrap_or_default()
    }

    /// Whether `key` has ever been dispatched.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.slots.lock().contains_key(key)
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.slots
            .lock()
            .get(key)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    /// Start a fetch for `key`, or join the one already in flight.
    ///
    /// `fetch` is only invoked when a new fetch is actually started.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch<F, Fut>(self: &Arc<Self>, key: &K, fetch: F) -> PendingFetch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SyncError>> + Send + 'static,
    {
        let mut slots = self.slots.lock();
        let slot = slots.entry(key.clone()).or_default();

        if let Some(pending) = &slot.in_flight {
            trace!(cache = self.name, key = %key, "Fetch in flight, coalescing");
            return pending.clone();
        }

        slot.entry.request_generation += 1;
        slot.entry.is_loading = true;
        let generation = slot.entry.request_generation;
        // Sent under the lock so `Loading` always precedes the completion
        self.notify(key, SyncState::Loading, generation);

        let request = fetch();
        let cache = Arc::clone(self);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(request).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(SyncError::new(
                    SyncErrorKind::Network,
                    format!("fetch task panicked: {}", panic_message(payload.as_ref())),
                )),
            };
            cache.complete(&task_key, generation, result);
        });

        let pending = async move {
            if let Err(err) = handle.await {
                warn!(error = %err, "Fetch task did not finish");
            }
        }
        .boxed()
        .shared();
        slot.in_flight = Some(pending.clone());
        drop(slots);

        debug!(cache = self.name, key = %key, generation, "Dispatched fetch");
        pending
    }

    /// Advance `key`'s generation so any in-flight fetch is discarded when
    /// it resolves. The entry keeps its last good data.
    ///
    /// Returns `true` if a fetch was in flight.
    pub fn abandon(&self, key: &K) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };

        slot.entry.request_generation += 1;
        slot.entry.is_loading = false;
        let was_in_flight = slot.in_flight.take().is_some();
        let generation = slot.entry.request_generation;
        let state = slot.entry.state();
        drop(slots);

        if was_in_flight {
            debug!(cache = self.name, key = %key, generation, "Abandoned in-flight fetch");
        }
        self.notify(key, state, generation);
        was_in_flight
    }

    /// Apply a fetch result, unless its generation is stale.
    fn complete(&self, key: &K, generation: u64, result: Result<T, SyncError>) {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };

        if slot.entry.request_generation != generation {
            debug!(
                cache = self.name,
                key = %key,
                generation,
                current = slot.entry.request_generation,
                "Discarding stale response"
            );
            return;
        }

        slot.in_flight = None;
        slot.entry.is_loading = false;
        let state = match result {
            Ok(data) => {
                slot.entry.data = Some(data);
                slot.entry.error = None;
                SyncState::Ready
            }
            Err(err) => {
                warn!(cache = self.name, key = %key, error = %err, "Fetch failed, keeping last good value");
                slot.entry.error = Some(err);
                SyncState::Error
            }
        };
        drop(slots);

        trace!(cache = self.name, key = %key, generation, ?state, "Applied fetch result");
        self.notify(key, state, generation);
    }

    fn notify(&self, key: &K, state: SyncState, generation: u64) {
        // No receivers is fine
        let _ = self.tx.send(CacheUpdate {
            key: key.clone(),
            state,
            generation,
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}
