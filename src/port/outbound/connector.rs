//! Exchange connector port for withdrawal operations.
//!
//! This trait is the single contract the rest of the system depends on; each
//! supported exchange provides one implementation under
//! `adapter::outbound`. Callers never reach past it to exchange-specific
//! clients.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{CoinInfo, FeePolicy, WithdrawalRequest, WithdrawalResult};
use crate::error::ConnectorError;

/// API credentials for one exchange account.
///
/// Immutable once constructed and owned exclusively by a single connector
/// instance. `passphrase` is only present for exchanges that require one.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for Credentials {
    // Secrets stay out of logs and panics.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***"))
            .finish()
    }
}

/// The supported exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Mexc,
    Binance,
    Okx,
    Bitget,
    Gate,
}

impl ExchangeId {
    /// All exchanges, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Mexc,
        Self::Binance,
        Self::Okx,
        Self::Bitget,
        Self::Gate,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mexc => "MEXC",
            Self::Binance => "Binance",
            Self::Okx => "OKX",
            Self::Bitget => "Bitget",
            Self::Gate => "Gate",
        }
    }

    /// Whether the exchange requires an API passphrase next to key/secret.
    #[must_use]
    pub const fn requires_passphrase(self) -> bool {
        matches!(self, Self::Okx | Self::Bitget)
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniform withdrawal capability over heterogeneous exchange APIs.
///
/// Implementations normalize their exchange's metadata, balance, and
/// withdrawal calls into this contract. `submit_withdrawal` moves real
/// funds and must be at-most-once per call: no implementation retries
/// internally.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Exchange name for logging and error context.
    fn name(&self) -> &'static str;

    /// How this exchange settles the withdrawal fee against the balance.
    fn fee_policy(&self) -> FeePolicy;

    /// Enumerate coins and their withdraw-enabled networks with fee/min
    /// metadata.
    async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError>;

    /// Free (available) balance for `coin`.
    async fn available_balance(&self, coin: &str) -> Result<Decimal, ConnectorError>;

    /// Submit one withdrawal. Side effect: moves real funds.
    async fn submit_withdrawal(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalResult, ConnectorError>;

    /// Whether this exchange can report status shortly after submission.
    ///
    /// When `false`, callers skip [`Self::poll_status`] entirely; absence of
    /// the capability is not an error.
    fn supports_status_poll(&self) -> bool {
        false
    }

    /// Best-effort status poll for a submitted withdrawal.
    ///
    /// Optional capability: the default returns `Ok(None)` and callers treat
    /// the submission result alone as authoritative.
    async fn poll_status(
        &self,
        coin: &str,
        reference: &str,
    ) -> Result<Option<serde_json::Value>, ConnectorError> {
        let _ = (coin, reference);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CoinInfo;
    use rust_decimal::Decimal;

    struct NullConnector;

    #[async_trait]
    impl ExchangeConnector for NullConnector {
        fn name(&self) -> &'static str {
            "Null"
        }

        fn fee_policy(&self) -> FeePolicy {
            FeePolicy::DeductedFromAmount
        }

        async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError> {
            Ok(Vec::new())
        }

        async fn available_balance(&self, _coin: &str) -> Result<Decimal, ConnectorError> {
            Ok(Decimal::ZERO)
        }

        async fn submit_withdrawal(
            &self,
            _request: &WithdrawalRequest,
        ) -> Result<WithdrawalResult, ConnectorError> {
            Ok(WithdrawalResult::accepted(None))
        }
    }

    #[test]
    fn status_polling_is_optional_by_default() {
        let connector = NullConnector;
        assert!(!connector.supports_status_poll());

        // The default poll is a no-op, not an error.
        let polled = tokio_test::block_on(connector.poll_status("USDT", "wd-1")).unwrap();
        assert!(polled.is_none());
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let creds = Credentials {
            api_key: "key-material".into(),
            api_secret: "secret-material".into(),
            passphrase: Some("phrase".into()),
        };
        let printed = format!("{creds:?}");
        assert!(!printed.contains("key-material"));
        assert!(!printed.contains("secret-material"));
        assert!(!printed.contains("phrase"));
    }

    #[test]
    fn passphrase_requirement_matches_exchanges() {
        assert!(ExchangeId::Okx.requires_passphrase());
        assert!(ExchangeId::Bitget.requires_passphrase());
        assert!(!ExchangeId::Mexc.requires_passphrase());
        assert!(!ExchangeId::Binance.requires_passphrase());
        assert!(!ExchangeId::Gate.requires_passphrase());
    }
}
