//! Two-sided stake pools as read from the ledger.
//!
//! A [`PoolReading`] is whatever the read API returned, with signed integers
//! so that malformed values survive long enough to be rejected. A
//! [`StakePool`] is a reading that passed validation: its stakes are
//! non-negative and `total_staked == option_a_stakes + option_b_stakes`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MarketId;
use super::money::Microunits;
use super::odds::{checked_stake, odds, OddsResult};

/// Lifecycle stage of a pool on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    /// Accepting stakes.
    Pending,
    /// Closed to stakes, awaiting resolution.
    Locked,
    /// Outcome settled. The pool no longer changes.
    Resolved,
}

impl PoolStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Locked => "locked",
            Self::Resolved => "resolved",
        }
    }

    /// Whether new stakes are accepted.
    #[must_use]
    pub const fn accepts_stakes(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "locked" => Ok(Self::Locked),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("unknown pool status '{other}'")),
        }
    }
}

/// Unvalidated pool values as returned by the read API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReading {
    pub market_id: MarketId,
    pub option_a_stakes: i128,
    pub option_b_stakes: i128,
    pub total_staked: i128,
    pub total_stake_count: i128,
    pub status: String,
    /// Unix timestamp, seconds.
    pub deadline: i64,
}

/// Validated snapshot of one market's stake pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePool {
    market_id: MarketId,
    option_a_stakes: Microunits,
    option_b_stakes: Microunits,
    total_stake_count: u64,
    status: PoolStatus,
    deadline: i64,
}

impl StakePool {
    /// Build a pool from already-valid parts.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InconsistentData`] if the stakes overflow the
    /// ledger's integer range when summed.
    pub fn try_new(
        market_id: MarketId,
        option_a_stakes: Microunits,
        option_b_stakes: Microunits,
        total_stake_count: u64,
        status: PoolStatus,
        deadline: i64,
    ) -> Result<Self, DomainError> {
        if option_a_stakes.checked_add(option_b_stakes).is_none() {
            return Err(DomainError::inconsistent(&market_id, "total stake overflows"));
        }
        Ok(Self {
            market_id,
            option_a_stakes,
            option_b_stakes,
            total_stake_count,
            status,
            deadline,
        })
    }

    #[must_use]
    pub fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub const fn option_a_stakes(&self) -> Microunits {
        self.option_a_stakes
    }

    #[must_use]
    pub const fn option_b_stakes(&self) -> Microunits {
        self.option_b_stakes
    }

    /// Sum of both sides. Cannot overflow, checked on construction.
    #[must_use]
    pub fn total_staked(&self) -> Microunits {
        Microunits::new(self.option_a_stakes.value() + self.option_b_stakes.value())
    }

    #[must_use]
    pub const fn total_stake_count(&self) -> u64 {
        self.total_stake_count
    }

    #[must_use]
    pub const fn status(&self) -> PoolStatus {
        self.status
    }

    /// Close of staking, unix seconds.
    #[must_use]
    pub const fn deadline(&self) -> i64 {
        self.deadline
    }

    #[must_use]
    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        deadline_at(self.deadline)
    }

    /// Current yes/no prices of this pool.
    #[must_use]
    pub fn odds(&self) -> OddsResult {
        odds(self.option_a_stakes.value(), self.option_b_stakes.value())
    }

    /// Share of the pool staked on each side, percent, unrounded.
    ///
    /// An empty pool is split evenly.
    #[must_use]
    pub fn side_shares(&self) -> (Decimal, Decimal) {
        let total = self.total_staked();
        if total.is_zero() {
            return (Decimal::from(50), Decimal::from(50));
        }
        let total = Decimal::from(total.value());
        let yes = Decimal::from(self.option_a_stakes.value()) * Decimal::ONE_HUNDRED / total;
        (yes, Decimal::ONE_HUNDRED - yes)
    }
}

impl TryFrom<PoolReading> for StakePool {
    type Error = DomainError;

    /// Validate a reading. Any failure rejects the whole snapshot.
    fn try_from(reading: PoolReading) -> Result<Self, Self::Error> {
        let market_id = reading.market_id;
        let stake = |field: &'static str, value: i128| {
            checked_stake(field, value)
                .map_err(|err| DomainError::inconsistent(&market_id, err.to_string()))
        };

        let a = stake("option_a_stakes", reading.option_a_stakes)?;
        let b = stake("option_b_stakes", reading.option_b_stakes)?;
        let total = stake("total_staked", reading.total_staked)?;
        let count = stake("total_stake_count", reading.total_stake_count)?;

        if i128::from(total) != i128::from(a) + i128::from(b) {
            return Err(DomainError::inconsistent(
                &market_id,
                format!("total_staked {total} != option_a_stakes {a} + option_b_stakes {b}"),
            ));
        }

        let status = reading
            .status
            .parse::<PoolStatus>()
            .map_err(|reason| DomainError::inconsistent(&market_id, reason))?;

        Self::try_new(
            market_id,
            Microunits::new(a),
            Microunits::new(b),
            count,
            status,
            reading.deadline,
        )
    }
}

/// Convert a unix deadline to a timestamp. Zero means "not set".
#[must_use]
pub fn deadline_at(deadline: i64) -> Option<DateTime<Utc>> {
    if deadline == 0 {
        return None;
    }
    DateTime::from_timestamp(deadline, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reading(a: i128, b: i128, total: i128) -> PoolReading {
        PoolReading {
            market_id: MarketId::new("m1"),
            option_a_stakes: a,
            option_b_stakes: b,
            total_staked: total,
            total_stake_count: 4,
            status: "pending".into(),
            deadline: 1_767_225_600,
        }
    }

    #[test]
    fn valid_reading_becomes_pool() {
        let pool = StakePool::try_from(reading(700, 300, 1000)).unwrap();
        assert_eq!(pool.total_staked(), Microunits::new(1000));
        assert_eq!(pool.status(), PoolStatus::Pending);
        assert_eq!(pool.odds(), OddsResult::from_yes(70));
        assert_eq!(pool.total_stake_count(), 4);
    }

    #[test]
    fn total_mismatch_is_inconsistent() {
        let err = StakePool::try_from(reading(700, 300, 999)).unwrap_err();
        assert!(matches!(err, DomainError::InconsistentData { .. }));
    }

    #[test]
    fn negative_stake_is_inconsistent() {
        let err = StakePool::try_from(reading(-1, 1, 0)).unwrap_err();
        assert!(matches!(err, DomainError::InconsistentData { .. }));
    }

    #[test]
    fn unknown_status_is_inconsistent() {
        let mut r = reading(1, 1, 2);
        r.status = "open".into();
        assert!(matches!(
            StakePool::try_from(r),
            Err(DomainError::InconsistentData { .. })
        ));
    }

    #[test]
    fn overflowing_sides_are_rejected() {
        let max = i128::from(u64::MAX);
        assert!(StakePool::try_from(reading(max, 1, max + 1)).is_err());
    }

    #[test]
    fn side_shares_split_even_when_empty() {
        let pool = StakePool::try_from(reading(0, 0, 0)).unwrap();
        assert_eq!(pool.side_shares(), (dec!(50), dec!(50)));

        let pool = StakePool::try_from(reading(1, 3, 4)).unwrap();
        assert_eq!(pool.side_shares(), (dec!(25), dec!(75)));
    }

    #[test]
    fn zero_deadline_has_no_date() {
        assert!(deadline_at(0).is_none());
        assert_eq!(deadline_at(86_400).unwrap().to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }
}
