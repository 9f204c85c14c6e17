//! Ledger read ports.
//!
//! Implementations only fetch. They do not cache, retry on a timer or
//! validate pool invariants; the sync services own all of that. Timeout
//! policy belongs to the implementation's transport.

use async_trait::async_trait;

use crate::domain::{MarketFilter, MarketId, MarketListing, PoolReading, PredictionRecord, UserId};
use crate::error::Result;

/// Reads the current stake pool of a market.
#[async_trait]
pub trait PoolReader: Send + Sync {
    /// Fetch the raw pool values for `market_id`.
    async fn fetch_pool(&self, market_id: &MarketId) -> Result<PoolReading>;

    /// Name of the backing source, for logging.
    fn source_name(&self) -> &'static str;
}

/// Reads a user's historical predictions from the indexer.
#[async_trait]
pub trait PredictionIndexer: Send + Sync {
    /// Fetch the complete current set of records for `user_id`.
    async fn fetch_predictions(&self, user_id: &UserId) -> Result<Vec<PredictionRecord>>;
}

/// Lists markets known to the ledger.
#[async_trait]
pub trait MarketDirectory: Send + Sync {
    async fn list_markets(&self, filter: MarketFilter) -> Result<Vec<MarketListing>>;
}
