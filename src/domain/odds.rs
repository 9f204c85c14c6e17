//! Implied probabilities from a two-sided stake pool.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Price shown for each side when a pool has no stakes yet.
pub const EVEN_PRICE: u8 = 50;

/// Complementary yes/no prices in whole percent.
///
/// `yes_price + no_price == 100` holds for every value produced by
/// [`odds`]: the no side is always derived from the yes side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OddsResult {
    yes_price: u8,
    no_price: u8,
}

impl OddsResult {
    /// Maximum uncertainty, 50/50.
    pub const EVEN: Self = Self {
        yes_price: EVEN_PRICE,
        no_price: 100 - EVEN_PRICE,
    };

    /// Build from a yes price; the no price is its complement.
    ///
    /// Prices above 100 are clamped.
    #[must_use]
    pub const fn from_yes(yes_price: u8) -> Self {
        let yes_price = if yes_price > 100 { 100 } else { yes_price };
        Self {
            yes_price,
            no_price: 100 - yes_price,
        }
    }

    #[must_use]
    pub const fn yes_price(self) -> u8 {
        self.yes_price
    }

    #[must_use]
    pub const fn no_price(self) -> u8 {
        self.no_price
    }
}

impl Default for OddsResult {
    fn default() -> Self {
        Self::EVEN
    }
}

/// Compute yes/no prices from option A (yes) and option B (no) stakes.
///
/// `yes = round_half_up(a / (a + b) * 100)` and `no = 100 - yes`.
/// An empty pool prices both sides at 50.
#[must_use]
pub fn odds(stakes_a: u64, stakes_b: u64) -> OddsResult {
    let a = u128::from(stakes_a);
    let total = a + u128::from(stakes_b);
    if total == 0 {
        return OddsResult::EVEN;
    }
    // floor((200a + t) / 2t) == round_half_up(100a / t)
    let yes = (200 * a + total) / (2 * total);
    // a <= total, so yes <= 100
    OddsResult::from_yes(yes as u8)
}

/// [`odds`] for inputs that may be negative, such as raw ledger values.
///
/// # Errors
///
/// Returns [`DomainError::InvalidInput`] if either stake is negative or does
/// not fit the ledger's unsigned 64-bit range.
pub fn try_odds(stakes_a: i128, stakes_b: i128) -> Result<OddsResult, DomainError> {
    let a = checked_stake("stakes_a", stakes_a)?;
    let b = checked_stake("stakes_b", stakes_b)?;
    Ok(odds(a, b))
}

/// Parse a stake given as a decimal string.
///
/// # Errors
///
/// Returns [`DomainError::InvalidInput`] for non-numeric or negative text.
pub fn parse_stake(field: &'static str, raw: &str) -> Result<u64, DomainError> {
    let value: i128 = raw
        .trim()
        .parse()
        .map_err(|_| DomainError::invalid_input(field, format!("'{raw}' is not an integer")))?;
    checked_stake(field, value)
}

pub(crate) fn checked_stake(field: &'static str, value: i128) -> Result<u64, DomainError> {
    if value < 0 {
        return Err(DomainError::invalid_input(
            field,
            format!("stake cannot be negative, got {value}"),
        ));
    }
    u64::try_from(value)
        .map_err(|_| DomainError::invalid_input(field, format!("stake {value} out of range")))
}
