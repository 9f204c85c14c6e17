//! Order previews: shares, payout multiplier and return for a trade intent.
//!
//! A preview is recomputed from scratch on every change to the amount, the
//! chosen outcome or the stake snapshot. Nothing here is cached.
//!
//! The payout multiplier is parimutuel and uses the post-trade pool: the
//! trader's own stake joins their side before the pool is divided, so
//!
//! ```text
//! odds             = (total + amount) / (side + amount)
//! shares           = amount / (avg_price / 100)
//! potential_return = shares * odds
//! profit           = potential_return - amount
//! ```
//!
//! Stakes stay integer microunits; the amount is converted to microunits
//! before it is added to the pool.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::money::{round_display, units_to_micro, MICROUNITS_PER_UNIT};
use super::odds::odds;
use super::outcome::Outcome;

/// Lowest implied price, in percent, used to price shares.
///
/// A side with no stake has an implied price of 0%; shares are priced at
/// this floor instead so the count stays finite.
pub const MIN_SHARE_PRICE: u8 = 1;

/// Preview of a prospective order at the current pool state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPreview {
    /// Outcome the preview was computed for.
    pub outcome: Outcome,
    /// Amount staked, in display units.
    pub amount: Decimal,
    /// Parimutuel payout multiplier of the post-trade pool.
    pub odds: Decimal,
    /// Implied probability of the chosen outcome, percent.
    pub avg_price: u8,
    /// Shares bought at the implied price.
    pub shares: Decimal,
    pub potential_return: Decimal,
    /// Always exactly `potential_return - amount`.
    pub profit: Decimal,
}

/// Preview values rounded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewDisplay {
    pub odds: Decimal,
    pub avg_price: u8,
    pub shares: Decimal,
    pub potential_return: Decimal,
    pub profit: Decimal,
}

impl OrderPreview {
    /// Round every value to two decimal places.
    ///
    /// Profit is derived from the rounded return so the displayed numbers
    /// still add up.
    #[must_use]
    pub fn display(&self) -> PreviewDisplay {
        let potential_return = round_display(self.potential_return);
        PreviewDisplay {
            odds: round_display(self.odds),
            avg_price: self.avg_price,
            shares: round_display(self.shares),
            potential_return,
            profit: potential_return - round_display(self.amount),
        }
    }

    /// True when the order would pay back more than it costs.
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.profit > Decimal::ZERO
    }
}

/// Preview an order of `amount` display units on `outcome`.
///
/// Returns `None` when `amount` is not positive: nothing has been entered
/// yet, which is not an error. Also `None` when the amount is too large to
/// be represented on the ledger.
#[must_use]
pub fn preview(
    amount: Decimal,
    outcome: Outcome,
    stakes_a: u64,
    stakes_b: u64,
) -> Option<OrderPreview> {
    if amount <= Decimal::ZERO {
        return None;
    }

    let prices = odds(stakes_a, stakes_b);
    let avg_price = outcome.price_in(prices);
    let share_price = Decimal::from(avg_price.max(MIN_SHARE_PRICE)) / Decimal::ONE_HUNDRED;
    let shares = amount.checked_div(share_price)?;

    let stake = units_to_micro(amount);
    let total = Decimal::from(stakes_a) + Decimal::from(stakes_b);
    let side = Decimal::from(outcome.side_stake(stakes_a, stakes_b));
    let multiplier = total
        .checked_add(stake)?
        .checked_div(side.checked_add(stake)?)?;

    let potential_return = shares.checked_mul(multiplier)?;
    let profit = potential_return - amount;

    Some(OrderPreview {
        outcome,
        amount,
        odds: multiplier,
        avg_price,
        shares,
        potential_return,
        profit,
    })
}

/// Parse a user-entered amount for previewing.
///
/// Empty input and non-positive numbers yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] for non-numeric text or amounts
/// beyond what the ledger can hold.
pub fn parse_amount(raw: &str) -> Result<Option<Decimal>, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| DomainError::validation(format!("'{trimmed}' is not a number")))?;

    if amount <= Decimal::ZERO {
        return Ok(None);
    }
    if amount > max_amount() {
        return Err(DomainError::validation(format!(
            "{amount} exceeds the largest ledger amount"
        )));
    }
    Ok(Some(amount))
}

/// Parse the amount and preview it in one step.
///
/// # Errors
///
/// Propagates [`parse_amount`] validation errors; the caller must block
/// submission on `Err`.
pub fn preview_input(
    raw: &str,
    outcome: Outcome,
    stakes_a: u64,
    stakes_b: u64,
) -> Result<Option<OrderPreview>, DomainError> {
    Ok(parse_amount(raw)?.and_then(|amount| preview(amount, outcome, stakes_a, stakes_b)))
}

/// Validate an amount for trade submission.
///
/// Stricter than [`parse_amount`]: an empty or non-positive amount is an
/// error here, as is a fraction smaller than one microunit.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] describing why submission is blocked.
pub fn validate_trade_amount(raw: &str) -> Result<Decimal, DomainError> {
    let amount =
        parse_amount(raw)?.ok_or_else(|| DomainError::validation("amount must be positive"))?;
    if !units_to_micro(amount).fract().is_zero() {
        return Err(DomainError::validation(format!(
            "{amount} has more than 6 decimal places"
        )));
    }
    Ok(amount)
}

fn max_amount() -> Decimal {
    Decimal::from(u64::MAX) / Decimal::from(MICROUNITS_PER_UNIT)
}
