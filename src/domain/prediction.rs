//! Historical stake records and the positions derived from them.
//!
//! Records are produced by the indexer; this module only classifies them.
//! Active records are open positions, won and lost records are closed.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MarketId, PredictionId};
use super::outcome::Outcome;

/// Indexer status of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Active,
    Won,
    Lost,
}

impl PredictionStatus {
    #[must_use]
    pub const fn is_closed(self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl FromStr for PredictionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(Self::Active),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(format!("unknown prediction status '{other}'")),
        }
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Won => "won",
            Self::Lost => "lost",
        })
    }
}

/// One historical stake placed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: PredictionId,
    pub pool_id: MarketId,
    pub pool_name: String,
    pub outcome: Outcome,
    pub amount_usd: Decimal,
    pub status: PredictionStatus,
}

/// Settlement result of a closed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionResult {
    Won,
    Lost,
}

/// Which list of positions to look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionTab {
    #[default]
    Active,
    Closed,
}

/// A record classified for portfolio display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub record: PredictionRecord,
    /// `None` while the position is still open.
    pub result: Option<PositionResult>,
}

impl Position {
    #[must_use]
    pub fn from_record(record: PredictionRecord) -> Self {
        let result = match record.status {
            PredictionStatus::Active => None,
            PredictionStatus::Won => Some(PositionResult::Won),
            PredictionStatus::Lost => Some(PositionResult::Lost),
        };
        Self { record, result }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.record.status.is_closed()
    }

    fn matches(&self, query: &str) -> bool {
        self.record.pool_name.to_lowercase().contains(query)
            || self.record.outcome.label().to_lowercase().contains(query)
    }
}

/// Aggregate figures over all of a user's positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioStats {
    pub total_value: Decimal,
    pub total_trades: usize,
    pub active_positions: usize,
    pub closed_positions: usize,
}

/// A user's positions split into open and closed lists.
///
/// Both lists keep the indexer's record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionBook {
    active: Vec<Position>,
    closed: Vec<Position>,
}

impl PositionBook {
    #[must_use]
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        let (active, closed) = records
            .iter()
            .cloned()
            .map(Position::from_record)
            .partition(Position::is_open);
        Self { active, closed }
    }

    #[must_use]
    pub fn active(&self) -> &[Position] {
        &self.active
    }

    #[must_use]
    pub fn closed(&self) -> &[Position] {
        &self.closed
    }

    #[must_use]
    pub fn tab(&self, tab: PositionTab) -> &[Position] {
        match tab {
            PositionTab::Active => &self.active,
            PositionTab::Closed => &self.closed,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.closed.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> PortfolioStats {
        let total_value = self
            .active
            .iter()
            .chain(&self.closed)
            .map(|p| p.record.amount_usd)
            .sum();
        PortfolioStats {
            total_value,
            total_trades: self.active.len() + self.closed.len(),
            active_positions: self.active.len(),
            closed_positions: self.closed.len(),
        }
    }

    /// Positions of `tab` whose pool name or outcome contains `query`,
    /// case-insensitively. A blank query returns the whole tab.
    #[must_use]
    pub fn search(&self, tab: PositionTab, query: &str) -> Vec<&Position> {
        let query = query.trim().to_lowercase();
        self.tab(tab)
            .iter()
            .filter(|p| query.is_empty() || p.matches(&query))
            .collect()
    }
}
