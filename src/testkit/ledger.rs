//! Scripted ledger ports.
//!
//! Each double answers from in-memory state set by the test, counts calls
//! per key and can hold fetches for a key behind a gate:
//!
//! ```ignore
//! let gate = reader.hold(&market);   // fetches for `market` now block
//! // ... dispatch refreshes ...
//! gate.add_permits(1);               // let exactly one fetch through
//! ```

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::domain::{
    MarketFilter, MarketId, MarketListing, PoolReading, PoolStatus, PredictionRecord, UserId,
};
use crate::error::{Error, Result};
use crate::port::outbound::ledger::{MarketDirectory, PoolReader, PredictionIndexer};

/// Per-key scripted answers shared by the doubles.
struct Script<K, V> {
    values: Mutex<HashMap<K, V>>,
    failures: Mutex<HashMap<K, VecDeque<Error>>>,
    gates: Mutex<HashMap<K, Arc<Semaphore>>>,
    calls: Mutex<HashMap<K, usize>>,
}

impl<K: Clone + Eq + Hash + std::fmt::Display, V: Clone> Script<K, V> {
    fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn hold(&self, key: &K) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().insert(key.clone(), Arc::clone(&gate));
        gate
    }

    fn open(&self, key: &K) {
        if let Some(gate) = self.gates.lock().remove(key) {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    fn calls(&self, key: &K) -> usize {
        self.calls.lock().get(key).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    async fn answer(&self, key: &K) -> Result<V> {
        *self.calls.lock().entry(key.clone()).or_default() += 1;

        let gate = self.gates.lock().get(key).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|_| Error::Network("gate closed".into()))?
                .forget();
        }

        if let Some(err) = self
            .failures
            .lock()
            .get_mut(key)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }

        self.values
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::Network(format!("no scripted response for {key}")))
    }
}

/// Scripted [`PoolReader`].
pub struct ScriptedPoolReader {
    script: Script<MarketId, PoolReading>,
}

impl ScriptedPoolReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    /// Answer fetches for the reading's own market with `reading`.
    pub fn set_pool(&self, reading: PoolReading) {
        let key = reading.market_id.clone();
        self.set_pool_for(&key, reading);
    }

    /// Answer fetches for `market_id` with `reading`, whatever market it names.
    pub fn set_pool_for(&self, market_id: &MarketId, reading: PoolReading) {
        self.script.values.lock().insert(market_id.clone(), reading);
    }

    /// Fail the next fetch for `market_id` with a network error.
    pub fn fail_next(&self, market_id: &MarketId, message: &str) {
        self.script
            .failures
            .lock()
            .entry(market_id.clone())
            .or_default()
            .push_back(Error::Network(message.into()));
    }

    /// Block fetches for `market_id` until permits are added to the gate.
    pub fn hold(&self, market_id: &MarketId) -> Arc<Semaphore> {
        self.script.hold(market_id)
    }

    /// Remove the gate for `market_id`, releasing blocked fetches.
    pub fn open(&self, market_id: &MarketId) {
        self.script.open(market_id);
    }

    /// Fetches started for `market_id`.
    #[must_use]
    pub fn calls(&self, market_id: &MarketId) -> usize {
        self.script.calls(market_id)
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.script.total_calls()
    }
}

impl Default for ScriptedPoolReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoolReader for ScriptedPoolReader {
    async fn fetch_pool(&self, market_id: &MarketId) -> Result<PoolReading> {
        self.script.answer(market_id).await
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Scripted [`PredictionIndexer`].
pub struct ScriptedIndexer {
    script: Script<UserId, Vec<PredictionRecord>>,
}

impl ScriptedIndexer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    pub fn set_records(&self, user_id: &UserId, records: Vec<PredictionRecord>) {
        self.script.values.lock().insert(user_id.clone(), records);
    }

    pub fn fail_next(&self, user_id: &UserId, message: &str) {
        self.script
            .failures
            .lock()
            .entry(user_id.clone())
            .or_default()
            .push_back(Error::Network(message.into()));
    }

    pub fn hold(&self, user_id: &UserId) -> Arc<Semaphore> {
        self.script.hold(user_id)
    }

    pub fn open(&self, user_id: &UserId) {
        self.script.open(user_id);
    }

    #[must_use]
    pub fn calls(&self, user_id: &UserId) -> usize {
        self.script.calls(user_id)
    }
}

impl Default for ScriptedIndexer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PredictionIndexer for ScriptedIndexer {
    async fn fetch_predictions(&self, user_id: &UserId) -> Result<Vec<PredictionRecord>> {
        self.script.answer(user_id).await
    }
}

/// Scripted [`MarketDirectory`] serving a fixed list of listings.
#[derive(Default)]
pub struct ScriptedDirectory {
    listings: Mutex<Vec<MarketListing>>,
}

impl ScriptedDirectory {
    #[must_use]
    pub fn new(listings: Vec<MarketListing>) -> Self {
        Self {
            listings: Mutex::new(listings),
        }
    }
}

#[async_trait]
impl MarketDirectory for ScriptedDirectory {
    async fn list_markets(&self, filter: MarketFilter) -> Result<Vec<MarketListing>> {
        let wanted = match filter {
            MarketFilter::All => None,
            MarketFilter::Pending => Some(PoolStatus::Pending),
            MarketFilter::Locked => Some(PoolStatus::Locked),
        };
        Ok(self
            .listings
            .lock()
            .iter()
            .filter(|listing| wanted.is_none() || listing.status == wanted)
            .cloned()
            .collect())
    }
}
