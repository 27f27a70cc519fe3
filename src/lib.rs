//! Dripfeed - batch cryptocurrency withdrawals across exchange accounts.
//!
//! For a chosen exchange, coin, and network, dripfeed disburses funds to a
//! list of destination addresses with randomized per-target amounts and
//! randomized delays between transfers, enforcing precision, network-support,
//! minimum-amount, and balance constraints before any funds move.
//!
//! # Architecture
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - **`domain`** - Pure, I/O-free logic
//!   - `amount` - exact-decimal precision normalization (floor, never round up)
//!   - `validator` - ordered pre-submission constraint checks
//!   - `jitter` - randomized amount/interval specs
//! - **`port`** - The [`port::outbound::connector::ExchangeConnector`]
//!   capability trait every exchange implements
//! - **`adapter::outbound`** - Five connectors (MEXC, Binance, OKX, Bitget,
//!   Gate); MEXC builds its signed requests from scratch, the others wrap
//!   thin REST gateways
//! - **`adapter::inbound::cli`** - Menu, prompts, batch-file loading, report
//! - **`app`** - The sequential [`app::batch::BatchOrchestrator`] with fault
//!   isolation, an in-memory balance ledger, and cancellation-aware pacing
//!
//! # Example
//!
//! ```no_run
//! use dripfeed::app::WithdrawSession;
//! use dripfeed::domain::{AmountSpec, IntervalSpec};
//!
//! # async fn example(connector: &dyn dripfeed::port::ExchangeConnector,
//! #                  targets: &[dripfeed::domain::WithdrawalTarget]) -> dripfeed::error::Result<()> {
//! let session = WithdrawSession::begin(connector).await?;
//! let plan = session.plan(
//!     "USDT",
//!     "BSC",
//!     "1-2".parse::<AmountSpec>().unwrap(),
//!     "30-90".parse::<IntervalSpec>().unwrap(),
//! )?;
//! let cancel = tokio_util::sync::CancellationToken::new();
//! let summary = session.run(plan, targets, &cancel).await?;
//! println!("{} accepted", summary.accepted());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
