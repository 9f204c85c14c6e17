//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the sync services and the systems they read
//! from. Adapters implement them; tests substitute scripted doubles.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────┐
//!                  │       Application        │
//!                  │  PoolSyncService         │
//!                  │  PredictionLedgerSync    │
//!                  └────────────┬─────────────┘
//!                               │ port::outbound
//!            ┌──────────────────┼──────────────────┐
//!            ▼                  ▼                  ▼
//!      ┌──────────┐      ┌─────────────┐    ┌──────────────┐
//!      │PoolReader│      │  Prediction │    │   Market     │
//!      │          │      │   Indexer   │    │  Directory   │
//!      └──────────┘      └─────────────┘    └──────────────┘
//! ```

pub mod outbound;
