//! Validation errors for withdrawal requests.
//!
//! These errors are returned by [`crate::domain::validator::validate`] and by
//! the amount normalizer. They are per-item and recoverable: a failing target
//! is recorded in the batch summary and the run continues.

use thiserror::Error;

/// Errors that occur when a withdrawal request violates a constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The requested coin does not exist on the exchange.
    #[error("unknown coin: {coin}")]
    UnknownCoin {
        /// The coin that was requested.
        coin: String,
    },

    /// The requested network is not among the coin's withdraw-enabled networks.
    #[error("network {network} is not supported for {coin}")]
    UnsupportedNetwork {
        /// The coin the request targeted.
        coin: String,
        /// The unsupported network.
        network: String,
    },

    /// Amount must be positive after precision normalization.
    #[error("withdrawal amount must be positive, got {amount}")]
    InvalidAmount {
        /// The invalid amount.
        amount: rust_decimal::Decimal,
    },

    /// Amount is below the network's minimum withdrawal.
    #[error("amount {amount} is below the {network} minimum of {min}")]
    BelowMinimum {
        /// The normalized amount that was requested.
        amount: rust_decimal::Decimal,
        /// The network's declared minimum.
        min: rust_decimal::Decimal,
        /// The network the minimum applies to.
        network: String,
    },

    /// The account balance cannot cover the withdrawal.
    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance {
        /// Amount the exchange will deduct (including fee where applicable).
        required: rust_decimal::Decimal,
        /// Available balance at the time of the check.
        available: rust_decimal::Decimal,
    },
}
