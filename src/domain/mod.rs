//! Exchange-agnostic domain types and pure logic.
//!
//! Everything in this module is I/O-free: amount normalization, coin and
//! network metadata, jitter specs, and request validation. Connectors and
//! the batch runner build on these types but never the other way around.

pub mod amount;
pub mod coin;
pub mod error;
pub mod jitter;
pub mod request;
pub mod target;
pub mod validator;

pub use amount::{truncate, DEFAULT_PRECISION};
pub use coin::{find_coin, CoinInfo, NetworkInfo};
pub use error::ValidationError;
pub use jitter::{AmountSpec, IntervalSpec, SpecParseError};
pub use request::{WithdrawalRequest, WithdrawalResult};
pub use target::WithdrawalTarget;
pub use validator::{validate, FeePolicy};
