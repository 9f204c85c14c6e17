//! Domain validation errors for calculator inputs and ledger snapshots.
//!
//! These errors are returned when an input or a fetched record violates a
//! domain rule. None of them is ever silently coerced into a default.
//!
//! # Examples
//!
//! ```
//! use oddsync::domain::error::DomainError;
//! use oddsync::domain::odds::try_odds;
//!
//! let result = try_odds(-1, 10);
//! assert!(matches!(result, Err(DomainError::InvalidInput { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed calculator input: non-numeric or negative stake.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending input.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// User-entered trade amount that must block submission.
    #[error("invalid amount: {reason}")]
    Validation {
        /// Why the amount was rejected.
        reason: String,
    },

    /// A fetched pool snapshot that breaks a pool invariant.
    #[error("inconsistent pool data for market {market_id}: {reason}")]
    InconsistentData {
        /// Market the snapshot belongs to.
        market_id: String,
        /// Which invariant failed.
        reason: String,
    },
}

impl DomainError {
    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(market_id: impl ToString, reason: impl Into<String>) -> Self {
        Self::InconsistentData {
            market_id: market_id.to_string(),
            reason: reason.into(),
        }
    }
}
