//! Precision normalization for withdrawal amounts.
//!
//! Exchanges reject amounts with more fractional digits than they support.
//! Amounts are truncated to a fixed decimal step with exact decimal
//! arithmetic — binary floating point would round `1.000005` up to `1.00001`
//! at the step boundary, which an exchange may then reject or, worse, pay.

use rust_decimal::Decimal;

use crate::domain::error::ValidationError;

/// Fractional digits accepted by all supported exchanges.
pub const DEFAULT_PRECISION: u32 = 5;

/// Truncate `amount` to at most `precision` fractional digits.
///
/// Returns the largest multiple of `10^-precision` that is `<= amount`;
/// never rounds up. Fails if `amount` is not positive.
pub fn truncate(amount: Decimal, precision: u32) -> Result<Decimal, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount { amount });
    }
    Ok(amount.trunc_with_scale(precision))
}
