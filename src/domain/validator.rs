//! Pre-submission validation of withdrawal requests.
//!
//! Validation runs against previously fetched metadata and balance
//! snapshots — it never touches the network, so it is deterministic and
//! unit-testable without I/O. No request reaches a connector unless it
//! passes every rule here.

use rust_decimal::Decimal;

use crate::domain::amount::{self, DEFAULT_PRECISION};
use crate::domain::coin::{self, CoinInfo};
use crate::domain::error::ValidationError;
use crate::domain::request::WithdrawalRequest;

/// How an exchange settles the withdrawal fee against the account balance.
///
/// Exchanges differ: some deduct the fee from the transferred amount, others
/// charge it on top, so the balance must cover `amount + fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePolicy {
    /// The fee comes out of the requested amount; balance must cover the
    /// amount only.
    DeductedFromAmount,
    /// The fee is charged in addition to the amount; balance must cover
    /// `amount + fee`.
    ChargedOnTop,
}

/// Validate `request` against a metadata snapshot and available balance.
///
/// Rules are applied in order, short-circuiting on the first failure:
/// coin exists, network supported, amount positive after normalization,
/// amount at or above the network minimum, balance sufficient under the
/// exchange's [`FeePolicy`]. Returns the precision-normalized amount to
/// submit.
pub fn validate(
    request: &WithdrawalRequest,
    coins: &[CoinInfo],
    available: Decimal,
    fee_policy: FeePolicy,
) -> Result<Decimal, ValidationError> {
    let coin_info =
        coin::find_coin(coins, &request.coin).ok_or_else(|| ValidationError::UnknownCoin {
            coin: request.coin.clone(),
        })?;

    let network =
        coin_info
            .network(&request.network)
            .ok_or_else(|| ValidationError::UnsupportedNetwork {
                coin: coin_info.coin.clone(),
                network: request.network.clone(),
            })?;

    let normalized = amount::truncate(request.amount, DEFAULT_PRECISION)?;
    if normalized <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount { amount: normalized });
    }

    if let Some(min) = network.withdraw_min {
        if normalized < min {
            return Err(ValidationError::BelowMinimum {
                amount: normalized,
                min,
                network: network.id.clone(),
            });
        }
    }

    let required = match fee_policy {
        FeePolicy::DeductedFromAmount => normalized,
        FeePolicy::ChargedOnTop => normalized + network.withdraw_fee,
    };
    if required > available {
        return Err(ValidationError::InsufficientBalance {
            required,
            available,
        });
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coin::NetworkInfo;
    use crate::domain::target::WithdrawalTarget;
    use rust_decimal_macros::dec;

    fn snapshot() -> Vec<CoinInfo> {
        vec![CoinInfo {
            coin: "USDT".into(),
            networks: vec![
                NetworkInfo {
                    id: "ERC20".into(),
                    withdraw_fee: dec!(2.5),
                    withdraw_min: Some(dec!(10)),
                },
                NetworkInfo {
                    id: "BSC".into(),
                    withdraw_fee: dec!(0.3),
                    withdraw_min: None,
                },
            ],
        }]
    }

    fn target() -> WithdrawalTarget {
        WithdrawalTarget {
            address: "0xabc".into(),
            memo: None,
            client_order_id: None,
            remark: None,
        }
    }

    fn request(coin: &str, network: &str, amount: Decimal) -> WithdrawalRequest {
        WithdrawalRequest::for_target(coin, network, amount, &target())
    }

    #[test]
    fn accepts_and_normalizes_valid_request() {
        let normalized = validate(
            &request("usdt", "BSC", dec!(1.2345678)),
            &snapshot(),
            dec!(100),
            FeePolicy::DeductedFromAmount,
        )
        .unwrap();
        assert_eq!(normalized, dec!(1.23456));
    }

    #[test]
    fn rejects_unknown_coin() {
        let err = validate(
            &request("DOGE", "BSC", dec!(1)),
            &snapshot(),
            dec!(100),
            FeePolicy::DeductedFromAmount,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownCoin { .. }));
    }

    #[test]
    fn rejects_unsupported_network() {
        let err = validate(
            &request("USDT", "TRC20", dec!(1)),
            &snapshot(),
            dec!(100),
            FeePolicy::DeductedFromAmount,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedNetwork { .. }));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [Decimal::ZERO, dec!(-3)] {
            let err = validate(
                &request("USDT", "BSC", amount),
                &snapshot(),
                dec!(100),
                FeePolicy::DeductedFromAmount,
            )
            .unwrap_err();
            assert!(matches!(err, ValidationError::InvalidAmount { .. }));
        }
    }

    #[test]
    fn rejects_amount_truncated_below_minimum() {
        // 10.000004 truncates to 10.00000, which still meets the minimum;
        // 9.999999 truncates to 9.99999, which does not.
        assert!(validate(
            &request("USDT", "ERC20", dec!(10.000004)),
            &snapshot(),
            dec!(100),
            FeePolicy::DeductedFromAmount,
        )
        .is_ok());

        let err = validate(
            &request("USDT", "ERC20", dec!(9.999999)),
            &snapshot(),
            dec!(100),
            FeePolicy::DeductedFromAmount,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::BelowMinimum { .. }));
    }

    #[test]
    fn balance_rule_depends_on_fee_policy() {
        // amount 20, fee 2.5, balance 21: fine when the fee is deducted from
        // the amount, insufficient when charged on top.
        let req = request("USDT", "ERC20", dec!(20));

        assert!(validate(&req, &snapshot(), dec!(21), FeePolicy::DeductedFromAmount).is_ok());

        let err = validate(&req, &snapshot(), dec!(21), FeePolicy::ChargedOnTop).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientBalance {
                required: dec!(22.5),
                available: dec!(21),
            }
        );
    }

    #[test]
    fn exact_balance_is_sufficient() {
        assert!(validate(
            &request("USDT", "BSC", dec!(50)),
            &snapshot(),
            dec!(50),
            FeePolicy::DeductedFromAmount,
        )
        .is_ok());
    }
}
