//! Monetary types for on-chain amounts and display values.
//!
//! Ledger amounts are integer microunits and stay integers for every
//! calculator input. Only values shown to a human are converted to
//! decimal units and rounded to two places.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Microunits per display unit.
pub const MICROUNITS_PER_UNIT: u64 = 1_000_000;

/// Decimal places used for any human-facing currency value.
pub const DISPLAY_DECIMALS: u32 = 2;

/// An integer amount of the chain's smallest denomination.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Microunits(u64);

impl Microunits {
    /// Zero microunits.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw microunit count.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw integer value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Exact value in display units, full precision.
    #[must_use]
    pub fn to_units(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(MICROUNITS_PER_UNIT)
    }

    /// Value in display units rounded to two decimal places.
    #[must_use]
    pub fn to_display(self) -> Decimal {
        round_display(self.to_units())
    }
}

impl fmt::Display for Microunits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Microunits {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Convert a display-unit amount to (fractional) microunits.
#[must_use]
pub fn units_to_micro(units: Decimal) -> Decimal {
    units * Decimal::from(MICROUNITS_PER_UNIT)
}

/// Round a display value half away from zero to two decimal places.
#[must_use]
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn to_units_divides_by_one_million() {
        assert_eq!(Microunits::new(1_500_000).to_units(), dec!(1.5));
        assert_eq!(Microunits::new(1).to_units(), dec!(0.000001));
    }

    #[test]
    fn to_display_rounds_half_up() {
        assert_eq!(Microunits::new(1_005_000).to_display(), dec!(1.01));
        assert_eq!(Microunits::new(1_004_999).to_display(), dec!(1.00));
    }

    #[test]
    fn units_to_micro_keeps_fractions() {
        assert_eq!(units_to_micro(dec!(0.25)), dec!(250000));
    }
}
