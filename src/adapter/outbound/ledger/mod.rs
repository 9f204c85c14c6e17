//! Ledger read API adapter.
//!
//! Implements [`PoolReader`](crate::port::outbound::ledger::PoolReader),
//! [`PredictionIndexer`](crate::port::outbound::ledger::PredictionIndexer) and
//! [`MarketDirectory`](crate::port::outbound::ledger::MarketDirectory) over HTTP.

pub mod client;
pub mod dto;
pub mod settings;

pub use client::LedgerClient;
pub use settings::{LedgerConfig, LedgerHttpConfig};
