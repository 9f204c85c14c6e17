//! Outbound adapters (driven side).

pub mod ledger;
