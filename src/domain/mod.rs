//! Ledger-agnostic domain logic: stake pools, odds, previews and positions.

pub mod error;
pub mod id;
pub mod market;
pub mod money;
pub mod odds;
pub mod outcome;
pub mod pool;
pub mod prediction;
pub mod preview;

// Core domain types
pub use error::DomainError;
pub use id::{MarketId, PredictionId, UserId};
pub use market::{MarketFallback, MarketFilter, MarketListing, MarketPhase, MarketSummary, MarketView};
pub use money::Microunits;
pub use odds::{odds, try_odds, OddsResult};
pub use outcome::Outcome;
pub use pool::{PoolReading, PoolStatus, StakePool};
pub use prediction::{
    PortfolioStats, Position, PositionBook, PositionResult, PositionTab, PredictionRecord,
    PredictionStatus,
};
pub use preview::{parse_amount, preview, preview_input, validate_trade_amount, OrderPreview};
