//! Sequential batch runner with fault isolation and jitter.
//!
//! Targets are processed strictly in input order, one at a time: exchanges
//! rate-limit withdrawal submissions and timestamp-signed requests must stay
//! monotonic, so no two withdrawals are ever in flight together. A failing
//! target is recorded and the run continues; only cancellation or the end of
//! the list stops it.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::{
    validator, AmountSpec, CoinInfo, FeePolicy, IntervalSpec, WithdrawalRequest, WithdrawalTarget,
};
use crate::error::ConnectorError;
use crate::port::outbound::connector::ExchangeConnector;

/// Wait before the best-effort status poll after a submission.
const STATUS_POLL_DELAY: Duration = Duration::from_secs(5);

/// The configured run: what to withdraw, over which network, with what
/// jitter.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub coin: String,
    pub network: String,
    pub amounts: AmountSpec,
    pub intervals: IntervalSpec,
}

/// Terminal state of one target.
#[derive(Debug, Clone)]
pub enum ItemStatus {
    /// The exchange accepted the withdrawal.
    Accepted { reference: Option<String> },
    /// Validation or submission failed; `reason` is the displayable cause.
    Failed { reason: String },
    /// The run was cancelled before this target was reached.
    Skipped,
}

/// Outcome of one target, attributable by index and address.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// Zero-based position in the batch input.
    pub index: usize,
    pub address: String,
    /// The drawn (and, for accepted items, normalized) amount.
    pub amount: Option<Decimal>,
    pub status: ItemStatus,
}

/// Final report of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchSummary {
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ItemStatus::Accepted { .. }))
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ItemStatus::Failed { .. }))
            .count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ItemStatus::Skipped))
            .count()
    }
}

/// Drives one batch of withdrawals through a single connector.
pub struct BatchOrchestrator<'a> {
    connector: &'a dyn ExchangeConnector,
    coins: &'a [CoinInfo],
    plan: BatchPlan,
    rng: StdRng,
    status_poll_delay: Duration,
}

impl<'a> BatchOrchestrator<'a> {
    #[must_use]
    pub fn new(connector: &'a dyn ExchangeConnector, coins: &'a [CoinInfo], plan: BatchPlan) -> Self {
        Self::with_rng(connector, coins, plan, StdRng::from_entropy())
    }

    /// Construct with a caller-supplied RNG; draws become reproducible under
    /// a seeded generator.
    #[must_use]
    pub fn with_rng(
        connector: &'a dyn ExchangeConnector,
        coins: &'a [CoinInfo],
        plan: BatchPlan,
        rng: StdRng,
    ) -> Self {
        Self {
            connector,
            coins,
            plan,
            rng,
            status_poll_delay: STATUS_POLL_DELAY,
        }
    }

    /// Override the pre-poll wait (tests shrink it to keep runs fast).
    #[must_use]
    pub fn with_status_poll_delay(mut self, delay: Duration) -> Self {
        self.status_poll_delay = delay;
        self
    }

    /// Run the batch to completion or cancellation.
    ///
    /// The available balance is read once up front and decremented in memory
    /// for every accepted withdrawal (plus the network fee when the exchange
    /// charges it on top), so later targets are validated against what the
    /// run has actually left, not a stale snapshot.
    pub async fn run(
        &mut self,
        targets: &[WithdrawalTarget],
        cancel: &CancellationToken,
    ) -> Result<BatchSummary, ConnectorError> {
        let exchange = self.connector.name();
        let fee_policy = self.connector.fee_policy();
        let network_fee = crate::domain::find_coin(self.coins, &self.plan.coin)
            .and_then(|c| c.network(&self.plan.network))
            .map(|n| n.withdraw_fee)
            .unwrap_or_default();

        let mut ledger = self
            .connector
            .available_balance(&self.plan.coin)
            .await?;
        info!(
            exchange,
            coin = %self.plan.coin,
            network = %self.plan.network,
            targets = targets.len(),
            balance = %ledger,
            "Starting batch run"
        );

        let mut summary = BatchSummary::default();

        for (index, target) in targets.iter().enumerate() {
            if cancel.is_cancelled() {
                Self::mark_remaining_skipped(&mut summary, targets, index);
                break;
            }

            info!(
                exchange,
                progress = %format!("{}/{}", index + 1, targets.len()),
                address = %target.address,
                "Processing target"
            );

            let drawn = self.plan.amounts.draw(&mut self.rng);
            let request =
                WithdrawalRequest::for_target(&self.plan.coin, &self.plan.network, drawn, target);

            let normalized =
                match validator::validate(&request, self.coins, ledger, fee_policy) {
                    Ok(amount) => amount,
                    Err(err) => {
                        warn!(
                            exchange,
                            coin = %request.coin,
                            network = %request.network,
                            address = %target.address,
                            error = %err,
                            "Validation failed, skipping target"
                        );
                        summary.outcomes.push(ItemOutcome {
                            index,
                            address: target.address.clone(),
                            amount: Some(drawn),
                            status: ItemStatus::Failed {
                                reason: err.to_string(),
                            },
                        });
                        continue;
                    }
                };

            let request = WithdrawalRequest {
                amount: normalized,
                ..request
            };

            match self.connector.submit_withdrawal(&request).await {
                Ok(mut result) => {
                    ledger -= match fee_policy {
                        FeePolicy::DeductedFromAmount => normalized,
                        FeePolicy::ChargedOnTop => normalized + network_fee,
                    };
                    info!(
                        exchange,
                        address = %target.address,
                        amount = %normalized,
                        reference = ?result.exchange_reference,
                        remaining = %ledger,
                        "Withdrawal accepted"
                    );

                    if let Some(snapshot) = self
                        .poll_after_submit(result.exchange_reference.as_deref(), cancel)
                        .await
                    {
                        result = result.with_snapshot(snapshot);
                    }

                    summary.outcomes.push(ItemOutcome {
                        index,
                        address: target.address.clone(),
                        amount: Some(normalized),
                        status: ItemStatus::Accepted {
                            reference: result.exchange_reference,
                        },
                    });
                }
                Err(err) => {
                    error!(
                        exchange,
                        address = %target.address,
                        amount = %normalized,
                        error = %err,
                        "Withdrawal failed"
                    );
                    summary.outcomes.push(ItemOutcome {
                        index,
                        address: target.address.clone(),
                        amount: Some(normalized),
                        status: ItemStatus::Failed {
                            reason: err.to_string(),
                        },
                    });
                    continue;
                }
            }

            if index + 1 < targets.len() {
                let delay = self.plan.intervals.draw(&mut self.rng);
                info!(exchange, delay_secs = delay.as_secs_f64(), "Waiting before next target");
                tokio::select! {
                    () = cancel.cancelled() => {
                        Self::mark_remaining_skipped(&mut summary, targets, index + 1);
                        break;
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }

        info!(
            exchange,
            accepted = summary.accepted(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "Batch run finished"
        );
        Ok(summary)
    }

    /// Best-effort status poll after an accepted submission. Never fails the
    /// item: the submission result stays authoritative.
    async fn poll_after_submit(
        &self,
        reference: Option<&str>,
        cancel: &CancellationToken,
    ) -> Option<serde_json::Value> {
        if !self.connector.supports_status_poll() {
            return None;
        }
        let reference = reference?;

        tokio::select! {
            () = cancel.cancelled() => return None,
            () = tokio::time::sleep(self.status_poll_delay) => {}
        }

        match self.connector.poll_status(&self.plan.coin, reference).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    exchange = self.connector.name(),
                    reference,
                    error = %err,
                    "Status poll failed, submission result stands"
                );
                None
            }
        }
    }

    fn mark_remaining_skipped(
        summary: &mut BatchSummary,
        targets: &[WithdrawalTarget],
        from: usize,
    ) {
        warn!(remaining = targets.len() - from, "Run cancelled, skipping remaining targets");
        for (index, target) in targets.iter().enumerate().skip(from) {
            summary.outcomes.push(ItemOutcome {
                index,
                address: target.address.clone(),
                amount: None,
                status: ItemStatus::Skipped,
            });
        }
    }
}
