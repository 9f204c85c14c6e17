//! Oddsync - parimutuel odds and ledger-synchronized pool caches.
//!
//! This crate prices binary prediction markets whose stakes live in an
//! on-ledger pool, previews orders against those pools, and keeps local
//! caches of pools and user predictions in sync with the ledger's read APIs.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Pure pricing and classification logic
//!   - `odds` - Implied yes/no prices from option stakes
//!   - `preview` - Order previews: shares, payout multiplier, profit
//!   - `pool` - Validated stake pool snapshots
//!   - `prediction` - User stake records and portfolio positions
//!
//! - **`application`** - Sync services over a coalescing keyed cache
//!   - `PoolSyncService` - Polls observed markets at a fixed interval
//!   - `PredictionLedgerSync` - Full-replace resync of a user's records
//!
//! - **`port`** / **`adapter`** - Read API traits and their HTTP client
//!
//! # Modules
//!
//! - [`domain`] - Ledger-agnostic types and calculators
//! - [`application`] - Cache and sync services
//! - [`port`] - Trait definitions for the ledger read APIs
//! - [`adapter`] - HTTP client and command-line interface
//! - [`infrastructure`] - Configuration and logging
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use oddsync::domain::{odds, preview, Outcome};
//! use rust_decimal_macros::dec;
//!
//! let prices = odds(700, 300);
//! assert_eq!(prices.yes_price(), 70);
//!
//! let order = preview(dec!(100), Outcome::Yes, 700_000_000, 300_000_000).unwrap();
//! assert_eq!(order.display().potential_return, dec!(196.43));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
