//! Shared fixtures for integration tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use dripfeed::domain::{
    CoinInfo, FeePolicy, NetworkInfo, WithdrawalRequest, WithdrawalResult, WithdrawalTarget,
};
use dripfeed::error::ConnectorError;
use dripfeed::port::ExchangeConnector;

/// A scripted connector: fixed metadata and balance, recorded submissions,
/// optional per-address rejections.
pub struct MockConnector {
    pub coins: Vec<CoinInfo>,
    pub balance: Decimal,
    pub fee_policy: FeePolicy,
    pub reject_addresses: HashSet<String>,
    pub supports_poll: bool,
    pub poll_fails: bool,
    pub submissions: Mutex<Vec<WithdrawalRequest>>,
    pub balance_calls: AtomicUsize,
}

impl MockConnector {
    pub fn new(balance: Decimal) -> Self {
        Self {
            coins: usdt_catalogue(),
            balance,
            fee_policy: FeePolicy::DeductedFromAmount,
            reject_addresses: HashSet::new(),
            supports_poll: false,
            poll_fails: false,
            submissions: Mutex::new(Vec::new()),
            balance_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(mut self, address: &str) -> Self {
        self.reject_addresses.insert(address.to_string());
        self
    }

    pub fn with_fee_policy(mut self, fee_policy: FeePolicy) -> Self {
        self.fee_policy = fee_policy;
        self
    }

    pub fn with_status_poll(mut self) -> Self {
        self.supports_poll = true;
        self
    }

    pub fn submitted_addresses(&self) -> Vec<String> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.address.clone())
            .collect()
    }
}

#[async_trait]
impl ExchangeConnector for MockConnector {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn fee_policy(&self) -> FeePolicy {
        self.fee_policy
    }

    async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError> {
        Ok(self.coins.clone())
    }

    async fn available_balance(&self, _coin: &str) -> Result<Decimal, ConnectorError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance)
    }

    async fn submit_withdrawal(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalResult, ConnectorError> {
        if self.reject_addresses.contains(&request.address) {
            return Err(ConnectorError::WithdrawalRejected {
                exchange: "Mock",
                reason: "address not allowlisted".into(),
            });
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(request.clone());
        Ok(WithdrawalResult::accepted(Some(format!(
            "wd-{}",
            submissions.len()
        ))))
    }

    fn supports_status_poll(&self) -> bool {
        self.supports_poll
    }

    async fn poll_status(
        &self,
        _coin: &str,
        reference: &str,
    ) -> Result<Option<serde_json::Value>, ConnectorError> {
        if self.poll_fails {
            return Err(ConnectorError::Api {
                exchange: "Mock",
                status: 500,
                body: "poll unavailable".into(),
            });
        }
        Ok(Some(serde_json::json!({ "id": reference, "state": "processing" })))
    }
}

/// USDT over BSC (no minimum) and ERC20 (fee 2.5, min 10).
pub fn usdt_catalogue() -> Vec<CoinInfo> {
    vec![CoinInfo {
        coin: "USDT".into(),
        networks: vec![
            NetworkInfo {
                id: "BSC".into(),
                withdraw_fee: dec!(0.3),
                withdraw_min: None,
            },
            NetworkInfo {
                id: "ERC20".into(),
                withdraw_fee: dec!(2.5),
                withdraw_min: Some(dec!(10)),
            },
        ],
    }]
}

pub fn targets(addresses: &[&str]) -> Vec<WithdrawalTarget> {
    addresses
        .iter()
        .map(|address| WithdrawalTarget {
            address: (*address).to_string(),
            memo: None,
            client_order_id: None,
            remark: None,
        })
        .collect()
}
