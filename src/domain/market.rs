//! Market descriptions for display: directory listings and merged views.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::id::MarketId;
use super::money::{round_display, Microunits};
use super::odds::{odds, OddsResult};
use super::pool::{deadline_at, PoolStatus, StakePool};

/// How a market is presented to traders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketPhase {
    /// Open for predictions.
    Live,
    /// Closed to predictions, resolution pending.
    Upcoming,
    Resolved,
}

impl From<PoolStatus> for MarketPhase {
    fn from(status: PoolStatus) -> Self {
        match status {
            PoolStatus::Pending => Self::Live,
            PoolStatus::Locked => Self::Upcoming,
            PoolStatus::Resolved => Self::Resolved,
        }
    }
}

/// Which markets to list from the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarketFilter {
    #[default]
    All,
    Pending,
    Locked,
}

/// A market entry as returned by the directory. Numeric values are raw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketListing {
    pub market_id: MarketId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub option_a_label: String,
    pub option_b_label: String,
    pub option_a_stakes: u64,
    pub option_b_stakes: u64,
    pub total_staked: u64,
    pub status: Option<PoolStatus>,
    pub deadline: i64,
    pub metric_type: String,
    pub threshold: String,
}

/// Display-ready summary of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSummary {
    pub market_id: MarketId,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub resolution: String,
    pub phase: MarketPhase,
    pub end_date: Option<DateTime<Utc>>,
    pub odds: OddsResult,
    pub volume: Microunits,
    pub volume_label: String,
}

impl MarketSummary {
    #[must_use]
    pub fn from_listing(listing: MarketListing, unit_symbol: &str) -> Self {
        let volume = Microunits::new(listing.total_staked);
        Self {
            title: listing.title.unwrap_or_else(|| "Market".into()),
            subtitle: format!("{} vs {}", listing.option_a_label, listing.option_b_label),
            description: listing
                .description
                .unwrap_or_else(|| "A prediction market.".into()),
            resolution: format!(
                "This market resolves based on the {} oracle. Threshold: {}",
                listing.metric_type, listing.threshold
            ),
            phase: listing.status.map_or(MarketPhase::Live, MarketPhase::from),
            end_date: deadline_at(listing.deadline),
            odds: odds(listing.option_a_stakes, listing.option_b_stakes),
            volume,
            volume_label: volume_label(volume, unit_symbol),
            market_id: listing.market_id,
        }
    }
}

/// Format a staked amount as a compact volume label.
///
/// Amounts of a thousand units or more are shown in thousands with one
/// decimal, smaller ones with two decimals.
#[must_use]
pub fn volume_label(volume: Microunits, unit_symbol: &str) -> String {
    let units = volume.to_units();
    let thousand = Decimal::ONE_THOUSAND;
    if units >= thousand {
        let thousands =
            (units / thousand).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        format!("{thousands:.1}K {unit_symbol}")
    } else {
        format!("{:.2} {unit_symbol}", round_display(units))
    }
}

/// Descriptive data the caller already has for a market, plus the numbers
/// to show until the ledger has answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketFallback {
    pub title: String,
    pub category: String,
    pub description: String,
    pub end_date: Option<DateTime<Utc>>,
    pub default_odds: OddsResult,
    pub default_volume: Microunits,
    pub default_traders: u64,
}

impl MarketFallback {
    /// A fallback with a title and the usual 50/50, zero-volume defaults.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Default for MarketFallback {
    fn default() -> Self {
        Self {
            title: "Market".into(),
            category: "DeFi".into(),
            description: String::new(),
            end_date: None,
            default_odds: OddsResult::EVEN,
            default_volume: Microunits::ZERO,
            default_traders: 0,
        }
    }
}

/// A market as the caller should show it right now.
///
/// Descriptive fields come from the fallback. Numeric fields come from the
/// last good ledger snapshot when there is one, otherwise from the
/// fallback defaults; `is_live_data` says which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketView {
    pub market_id: MarketId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub end_date: Option<DateTime<Utc>>,
    pub odds: OddsResult,
    /// Unrounded share of the pool on option A, percent. Sizes the yes bar.
    pub yes_share_pct: Decimal,
    pub no_share_pct: Decimal,
    /// Option A stake in display units, two decimals.
    pub option_a_staked: Decimal,
    pub option_b_staked: Decimal,
    pub volume: Microunits,
    pub traders: u64,
    pub phase: Option<MarketPhase>,
    pub is_live_data: bool,
}

impl MarketView {
    #[must_use]
    pub fn merge(market_id: MarketId, fallback: &MarketFallback, pool: Option<&StakePool>) -> Self {
        let (odds, volume, traders, phase, end_date) = match pool {
            Some(pool) => (
                pool.odds(),
                pool.total_staked(),
                pool.total_stake_count(),
                Some(MarketPhase::from(pool.status())),
                pool.deadline_at().or(fallback.end_date),
            ),
            None => (
                fallback.default_odds,
                fallback.default_volume,
                fallback.default_traders,
                None,
                fallback.end_date,
            ),
        };

        let ((yes_share_pct, no_share_pct), (option_a_staked, option_b_staked)) = match pool {
            Some(pool) => (
                pool.side_shares(),
                (
                    pool.option_a_stakes().to_display(),
                    pool.option_b_stakes().to_display(),
                ),
            ),
            None => (
                (
                    Decimal::from(odds.yes_price()),
                    Decimal::from(odds.no_price()),
                ),
                (Decimal::ZERO, Decimal::ZERO),
            ),
        };

        Self {
            market_id,
            title: fallback.title.clone(),
            category: fallback.category.clone(),
            description: fallback.description.clone(),
            end_date,
            odds,
            yes_share_pct,
            no_share_pct,
            option_a_staked,
            option_b_staked,
            volume,
            traders,
            phase,
            is_live_data: pool.is_some(),
        }
    }
}
