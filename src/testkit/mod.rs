//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`] - Scripted [`PoolReader`](crate::port::outbound::ledger::PoolReader),
//!   [`PredictionIndexer`](crate::port::outbound::ledger::PredictionIndexer) and
//!   [`MarketDirectory`](crate::port::outbound::ledger::MarketDirectory) doubles.
//! - [`domain`] - Builders for domain primitives: pools, records, listings.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod ledger;
