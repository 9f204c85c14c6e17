//! Ledger synchronization services.
//!
//! - [`pool::PoolSyncService`]: polled per-market stake pools
//! - [`ledger::PredictionLedgerSync`]: per-user prediction records, resynced on demand

pub mod ledger;
pub mod pool;

pub use ledger::PredictionLedgerSync;
pub use pool::{PoolSyncConfig, PoolSyncService, PoolWatch};
