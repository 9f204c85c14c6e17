//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions so tests focus on assertions
//! rather than construction boilerplate.

use rust_decimal::Decimal;

use crate::domain::{
    MarketId, MarketListing, Microunits, Outcome, PoolReading, PoolStatus, PredictionId,
    PredictionRecord, PredictionStatus, StakePool,
};

/// Deadline used by every builder: 2026-01-01T00:00:00Z.
pub const DEADLINE: i64 = 1_767_225_600;

/// Create a [`MarketId`] from a string.
pub fn market_id(id: &str) -> MarketId {
    MarketId::from(id)
}

/// Create a pending, consistent [`PoolReading`] with the given stakes.
pub fn pool_reading(market: &str, stakes_a: i128, stakes_b: i128) -> PoolReading {
    PoolReading {
        market_id: MarketId::new(market),
        option_a_stakes: stakes_a,
        option_b_stakes: stakes_b,
        total_staked: stakes_a + stakes_b,
        total_stake_count: 1,
        status: "pending".into(),
        deadline: DEADLINE,
    }
}

/// Create a validated pending [`StakePool`].
pub fn stake_pool(market: &str, stakes_a: u64, stakes_b: u64) -> StakePool {
    StakePool::try_new(
        MarketId::new(market),
        Microunits::new(stakes_a),
        Microunits::new(stakes_b),
        1,
        PoolStatus::Pending,
        DEADLINE,
    )
    .expect("test stakes must not overflow")
}

/// Create a one-unit [`PredictionRecord`] on pool `pool-{id}`.
pub fn prediction(id: &str, outcome: Outcome, status: PredictionStatus) -> PredictionRecord {
    PredictionRecord {
        id: PredictionId::new(id),
        pool_id: MarketId::new(format!("pool-{id}")),
        pool_name: format!("Market {id}"),
        outcome,
        amount_usd: Decimal::ONE,
        status,
    }
}

/// Create a directory listing with the given stakes and status.
pub fn listing(market: &str, stakes_a: u64, stakes_b: u64, status: PoolStatus) -> MarketListing {
    MarketListing {
        market_id: MarketId::new(market),
        title: Some(format!("Market {market}")),
        description: None,
        option_a_label: "YES".into(),
        option_b_label: "NO".into(),
        option_a_stakes: stakes_a,
        option_b_stakes: stakes_b,
        total_staked: stakes_a + stakes_b,
        status: Some(status),
        deadline: DEADLINE,
        metric_type: "price".into(),
        threshold: "100".into(),
    }
}
