//! Integration tests for the sequential batch runner.

mod support;

use std::sync::atomic::Ordering;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use dripfeed::app::{BatchOrchestrator, BatchPlan, ItemStatus};
use dripfeed::domain::{AmountSpec, IntervalSpec};

use support::{targets, MockConnector};

fn plan(network: &str, amounts: AmountSpec) -> BatchPlan {
    BatchPlan {
        coin: "USDT".into(),
        network: network.into(),
        amounts,
        intervals: IntervalSpec::Fixed(0.0),
    }
}

fn seeded(connector: &MockConnector, plan_: BatchPlan) -> BatchOrchestrator<'_> {
    BatchOrchestrator::with_rng(connector, &connector.coins, plan_, StdRng::seed_from_u64(7))
        .with_status_poll_delay(Duration::ZERO)
}

#[tokio::test]
async fn one_bad_target_never_aborts_the_batch() {
    let connector = MockConnector::new(dec!(1000)).rejecting("addr-2");
    let cancel = CancellationToken::new();

    let summary = seeded(&connector, plan("BSC", AmountSpec::Fixed(dec!(5))))
        .run(&targets(&["addr-1", "addr-2", "addr-3"]), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.accepted(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.skipped(), 0);

    // The failure is attributable to target 2 specifically.
    let failed: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| matches!(o.status, ItemStatus::Failed { .. }))
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].index, 1);
    assert_eq!(failed[0].address, "addr-2");

    // Targets 1 and 3 were both attempted, in input order.
    assert_eq!(connector.submitted_addresses(), vec!["addr-1", "addr-3"]);
}

#[tokio::test]
async fn validation_failure_never_reaches_the_connector() {
    let connector = MockConnector::new(dec!(1000));
    let cancel = CancellationToken::new();

    // TRC20 is not in the catalogue, so every target fails validation.
    let summary = seeded(&connector, plan("TRC20", AmountSpec::Fixed(dec!(5))))
        .run(&targets(&["addr-1", "addr-2"]), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.failed(), 2);
    assert!(connector.submitted_addresses().is_empty());
}

#[tokio::test]
async fn ledger_detects_cumulative_insufficiency() {
    // Balance 25, three fixed withdrawals of 10: the first two commit 20,
    // the third must fail against the decremented ledger even though the
    // initial snapshot would have allowed it.
    let connector = MockConnector::new(dec!(25));
    let cancel = CancellationToken::new();

    let summary = seeded(&connector, plan("BSC", AmountSpec::Fixed(dec!(10))))
        .run(&targets(&["addr-1", "addr-2", "addr-3"]), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.accepted(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(connector.submitted_addresses(), vec!["addr-1", "addr-2"]);

    match &summary.outcomes[2].status {
        ItemStatus::Failed { reason } => assert!(reason.contains("insufficient balance")),
        other => panic!("expected failure, got {other:?}"),
    }

    // The balance was read once up front, not per item.
    assert_eq!(connector.balance_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn charged_on_top_fee_consumes_the_ledger_faster() {
    use dripfeed::domain::FeePolicy;

    // Fee 0.3 per BSC withdrawal charged on top: 3 x 10.3 = 30.9 > 30.
    let connector = MockConnector::new(dec!(30)).with_fee_policy(FeePolicy::ChargedOnTop);
    let cancel = CancellationToken::new();

    let summary = seeded(&connector, plan("BSC", AmountSpec::Fixed(dec!(10))))
        .run(&targets(&["addr-1", "addr-2", "addr-3"]), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.accepted(), 2);
    assert_eq!(summary.failed(), 1);
}

#[tokio::test]
async fn below_minimum_amounts_are_rejected_before_submission() {
    let connector = MockConnector::new(dec!(1000));
    let cancel = CancellationToken::new();

    // ERC20 declares a minimum of 10.
    let summary = seeded(&connector, plan("ERC20", AmountSpec::Fixed(dec!(9.5))))
        .run(&targets(&["addr-1"]), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.failed(), 1);
    assert!(connector.submitted_addresses().is_empty());
}

#[tokio::test]
async fn drawn_amounts_stay_inside_the_configured_range() {
    let connector = MockConnector::new(dec!(10_000));
    let cancel = CancellationToken::new();

    let spec = AmountSpec::Range {
        min: dec!(10),
        max: dec!(20),
    };
    seeded(&connector, plan("BSC", spec))
        .run(&targets(&["a1", "a2", "a3", "a4", "a5"]), &cancel)
        .await
        .unwrap();

    let submissions = connector.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 5);
    for request in submissions.iter() {
        assert!(request.amount >= dec!(10) && request.amount < dec!(20));
        // Normalized before submission: at most five fractional digits.
        assert!(request.amount.scale() <= 5);
    }
}

#[tokio::test]
async fn cancellation_skips_unreached_targets() {
    let connector = MockConnector::new(dec!(1000));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = seeded(&connector, plan("BSC", AmountSpec::Fixed(dec!(1))))
        .run(&targets(&["addr-1", "addr-2"]), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.accepted(), 0);
    assert_eq!(summary.skipped(), 2);
    assert!(connector.submitted_addresses().is_empty());
}

#[tokio::test]
async fn failed_status_poll_leaves_submission_authoritative() {
    let mut connector = MockConnector::new(dec!(1000)).with_status_poll();
    connector.poll_fails = true;
    let cancel = CancellationToken::new();

    let summary = seeded(&connector, plan("BSC", AmountSpec::Fixed(dec!(2))))
        .run(&targets(&["addr-1"]), &cancel)
        .await
        .unwrap();

    assert_eq!(summary.accepted(), 1);
    match &summary.outcomes[0].status {
        ItemStatus::Accepted { reference } => assert_eq!(reference.as_deref(), Some("wd-1")),
        other => panic!("expected acceptance, got {other:?}"),
    }
}
