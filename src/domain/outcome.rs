//! Binary market outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::odds::OddsResult;

/// Side of a binary market. `Yes` is option A, `No` is option B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// Implied price of this side in whole percent.
    #[must_use]
    pub const fn price_in(self, odds: OddsResult) -> u8 {
        match self {
            Self::Yes => odds.yes_price(),
            Self::No => odds.no_price(),
        }
    }

    /// Stake backing this side, given option A and option B stakes.
    #[must_use]
    pub const fn side_stake(self, stakes_a: u64, stakes_b: u64) -> u64 {
        match self {
            Self::Yes => stakes_a,
            Self::No => stakes_b,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "a" => Ok(Self::Yes),
            "no" | "b" => Ok(Self::No),
            other => Err(DomainError::invalid_input(
                "outcome",
                format!("expected Yes or No, got '{other}'"),
            )),
        }
    }
}
