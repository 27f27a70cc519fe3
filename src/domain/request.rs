//! Withdrawal request and result types.

use rust_decimal::Decimal;

use crate::domain::target::WithdrawalTarget;

/// A fully-specified withdrawal, ready for validation and submission.
///
/// `amount` must be positive and `network` must be one of the coin's
/// supported networks; both are enforced by the validator before any
/// connector sees the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub coin: String,
    pub network: String,
    pub address: String,
    pub amount: Decimal,
    pub memo: Option<String>,
    pub client_order_id: Option<String>,
    pub remark: Option<String>,
}

impl WithdrawalRequest {
    /// Build a request for one batch target with the drawn amount.
    #[must_use]
    pub fn for_target(
        coin: &str,
        network: &str,
        amount: Decimal,
        target: &WithdrawalTarget,
    ) -> Self {
        Self {
            coin: coin.to_string(),
            network: network.to_string(),
            address: target.address.clone(),
            amount,
            memo: target.memo.clone(),
            client_order_id: target.client_order_id.clone(),
            remark: target.remark.clone(),
        }
    }
}

/// Outcome of a submitted withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawalResult {
    /// Whether the exchange accepted the submission.
    pub accepted: bool,
    /// Exchange-assigned withdrawal id, when one is returned.
    pub exchange_reference: Option<String>,
    /// Best-effort status snapshot from a post-submit poll; opaque to callers.
    pub status_snapshot: Option<serde_json::Value>,
}

impl WithdrawalResult {
    /// An accepted submission with the exchange's reference id.
    #[must_use]
    pub fn accepted(reference: Option<String>) -> Self {
        Self {
            accepted: true,
            exchange_reference: reference,
            status_snapshot: None,
        }
    }

    /// Attach a status snapshot from a post-submit poll.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: serde_json::Value) -> Self {
        self.status_snapshot = Some(snapshot);
        self
    }
}
