//! Per-run withdrawal session: metadata snapshot and run configuration.
//!
//! A session fetches the exchange's coin catalogue once, resolves the
//! operator's coin/network choice against it, and launches the batch run.
//! Configuration errors (unknown coin, unsupported network) surface here,
//! before any withdrawal is attempted.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::batch::{BatchOrchestrator, BatchPlan, BatchSummary};
use crate::domain::{find_coin, AmountSpec, CoinInfo, IntervalSpec, ValidationError, WithdrawalTarget};
use crate::error::ConnectorError;
use crate::port::outbound::connector::ExchangeConnector;

/// One configured withdrawal session against a single exchange account.
pub struct WithdrawSession<'a> {
    connector: &'a dyn ExchangeConnector,
    coins: Vec<CoinInfo>,
}

impl<'a> WithdrawSession<'a> {
    /// Open a session by fetching the coin catalogue once.
    pub async fn begin(connector: &'a dyn ExchangeConnector) -> Result<Self, ConnectorError> {
        let coins = connector.list_coin_networks().await?;
        info!(
            exchange = connector.name(),
            coins = coins.len(),
            "Coin catalogue loaded"
        );
        Ok(Self { connector, coins })
    }

    #[must_use]
    pub fn coins(&self) -> &[CoinInfo] {
        &self.coins
    }

    /// Resolve a coin the operator typed, case-insensitively.
    pub fn resolve_coin(&self, coin: &str) -> Result<&CoinInfo, ValidationError> {
        find_coin(&self.coins, coin).ok_or_else(|| ValidationError::UnknownCoin {
            coin: coin.to_string(),
        })
    }

    /// Assemble the run plan, checking the network against the coin's
    /// supported list.
    pub fn plan(
        &self,
        coin: &str,
        network: &str,
        amounts: AmountSpec,
        intervals: IntervalSpec,
    ) -> Result<BatchPlan, ValidationError> {
        let info = self.resolve_coin(coin)?;
        if info.network(network).is_none() {
            return Err(ValidationError::UnsupportedNetwork {
                coin: info.coin.clone(),
                network: network.to_string(),
            });
        }
        Ok(BatchPlan {
            coin: info.coin.clone(),
            network: network.to_string(),
            amounts,
            intervals,
        })
    }

    /// Run the batch against this session's metadata snapshot.
    pub async fn run(
        &self,
        plan: BatchPlan,
        targets: &[WithdrawalTarget],
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, ConnectorError> {
        BatchOrchestrator::new(self.connector, &self.coins, plan)
            .run(targets, cancel)
            .await
    }
}
