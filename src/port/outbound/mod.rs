//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the read APIs the core depends on: the pool
//! read API, the prediction indexer and the market directory.

pub mod ledger;
