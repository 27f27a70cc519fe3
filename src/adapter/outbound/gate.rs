//! Gate connector.
//!
//! Gate's v4 API signs with HMAC-SHA512 over
//! `METHOD\npath\nquery\nSHA512(body)\ntimestamp` and carries `KEY`,
//! `Timestamp`, and `SIGN` headers. Gate also names chains by its own short
//! codes (`eth`, `bsc`, ...), so a caller-supplied generic network code is
//! translated through [`CHAIN_ALIASES`] immediately before submission.
//! That table is Gate-local: no other connector remaps networks.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client as HttpClient, Method};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::{Digest, Sha512};
use tracing::debug;

use crate::adapter::outbound::http::{read_json, transport};
use crate::domain::{
    amount, CoinInfo, FeePolicy, NetworkInfo, WithdrawalRequest, WithdrawalResult,
    DEFAULT_PRECISION,
};
use crate::error::ConnectorError;
use crate::port::outbound::connector::{Credentials, ExchangeConnector};

type HmacSha512 = Hmac<Sha512>;

const EXCHANGE: &str = "Gate";

/// Production REST host.
pub const DEFAULT_HOST: &str = "https://api.gateio.ws";

/// Caller-facing network codes and the chain identifiers Gate expects.
/// Codes not present here are passed through unchanged.
const CHAIN_ALIASES: &[(&str, &str)] = &[
    ("MATIC", "polygon"),
    ("ERC20", "eth"),
    ("BEP20", "bsc"),
    ("OPBNB", "opbnb"),
    ("ARBONE", "arbevm"),
    ("OPTIMISM", "opeth"),
    ("SOLANA", "sol"),
    ("BASE", "baseevm"),
];

fn vendor_chain(network: &str) -> &str {
    CHAIN_ALIASES
        .iter()
        .find(|(code, _)| network.eq_ignore_ascii_case(code))
        .map_or(network, |(_, chain)| chain)
}

#[derive(Debug, Deserialize)]
struct GateCurrency {
    currency: String,
    #[serde(default)]
    chains: Vec<GateChain>,
}

#[derive(Debug, Deserialize)]
struct GateChain {
    name: String,
    #[serde(default)]
    withdraw_disabled: bool,
    #[serde(default)]
    withdraw_fee: Option<String>,
    #[serde(default)]
    withdraw_min: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GateAccount {
    currency: String,
    available: String,
}

#[derive(Debug, Deserialize)]
struct GateWithdrawAck {
    id: Option<String>,
}

fn parse_decimal(raw: &str) -> Decimal {
    raw.parse().unwrap_or_default()
}

fn coin_info_from(raw: GateCurrency) -> Option<CoinInfo> {
    let networks: Vec<NetworkInfo> = raw
        .chains
        .into_iter()
        .filter(|c| !c.withdraw_disabled)
        .map(|c| NetworkInfo {
            id: c.name,
            withdraw_fee: c
                .withdraw_fee
                .as_deref()
                .map(parse_decimal)
                .unwrap_or_default(),
            withdraw_min: c.withdraw_min.as_deref().map(parse_decimal),
        })
        .collect();

    (!networks.is_empty()).then_some(CoinInfo {
        coin: raw.currency,
        networks,
    })
}

/// Gate exchange connector.
pub struct GateConnector {
    http: HttpClient,
    host: String,
    api_key: String,
    api_secret: String,
}

impl GateConnector {
    #[must_use]
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_host(credentials, DEFAULT_HOST)
    }

    #[must_use]
    pub fn with_host(credentials: &Credentials, host: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            host: host.into(),
            api_key: credentials.api_key.clone(),
            api_secret: credentials.api_secret.clone(),
        }
    }

    fn sign(&self, method: &Method, path: &str, query: &str, body: &str, timestamp: i64) -> String {
        let body_hash = hex::encode(Sha512::digest(body.as_bytes()));
        let payload = format!(
            "{}\n{path}\n{query}\n{body_hash}\n{timestamp}",
            method.as_str()
        );
        let mut mac = HmacSha512::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    async fn send_public(&self, path: &str) -> Result<serde_json::Value, ConnectorError> {
        let response = self
            .http
            .get(format!("{}{}", self.host, path))
            .send()
            .await
            .map_err(|source| transport(EXCHANGE, source))?;
        read_json(EXCHANGE, response).await
    }

    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ConnectorError> {
        let timestamp = chrono::Utc::now().timestamp();
        let body_text = body.map(|b| b.to_string()).unwrap_or_default();
        let signature = self.sign(&method, path, query, &body_text, timestamp);

        let url = if query.is_empty() {
            format!("{}{}", self.host, path)
        } else {
            format!("{}{}?{}", self.host, path, query)
        };

        let mut request = self
            .http
            .request(method, url)
            .header("KEY", &self.api_key)
            .header("Timestamp", timestamp.to_string())
            .header("SIGN", signature)
            .header("Content-Type", "application/json");
        if !body_text.is_empty() {
            request = request.body(body_text);
        }

        let response = request
            .send()
            .await
            .map_err(|source| transport(EXCHANGE, source))?;
        read_json(EXCHANGE, response).await
    }
}

#[async_trait]
impl ExchangeConnector for GateConnector {
    fn name(&self) -> &'static str {
        EXCHANGE
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::ChargedOnTop
    }

    async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError> {
        let raw = self.send_public("/api/v4/spot/currencies").await?;
        let currencies: Vec<GateCurrency> =
            serde_json::from_value(raw).map_err(|err| ConnectorError::MetadataFetch {
                exchange: EXCHANGE,
                reason: err.to_string(),
            })?;

        let infos: Vec<CoinInfo> = currencies.into_iter().filter_map(coin_info_from).collect();
        debug!(exchange = EXCHANGE, coins = infos.len(), "Fetched coin metadata");
        Ok(infos)
    }

    async fn available_balance(&self, coin: &str) -> Result<Decimal, ConnectorError> {
        let query = format!("currency={coin}");
        let raw = self
            .send_signed(Method::GET, "/api/v4/spot/accounts", &query, None)
            .await?;
        let accounts: Vec<GateAccount> =
            serde_json::from_value(raw).map_err(|err| ConnectorError::BalanceFetch {
                exchange: EXCHANGE,
                coin: coin.to_string(),
                reason: err.to_string(),
            })?;

        accounts
            .iter()
            .find(|a| a.currency.eq_ignore_ascii_case(coin))
            .map(|a| parse_decimal(&a.available))
            .ok_or_else(|| ConnectorError::BalanceFetch {
                exchange: EXCHANGE,
                coin: coin.to_string(),
                reason: "no balance entry for coin".to_string(),
            })
    }

    async fn submit_withdrawal(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalResult, ConnectorError> {
        let normalized = amount::truncate(request.amount, DEFAULT_PRECISION).map_err(|err| {
            ConnectorError::WithdrawalRejected {
                exchange: EXCHANGE,
                reason: err.to_string(),
            }
        })?;

        let mut body = serde_json::json!({
            "currency": request.coin,
            "amount": normalized.to_string(),
            "address": request.address,
            "chain": vendor_chain(&request.network),
        });
        if let Some(memo) = &request.memo {
            body["memo"] = serde_json::Value::String(memo.clone());
        }
        if let Some(id) = &request.client_order_id {
            body["withdraw_order_id"] = serde_json::Value::String(id.clone());
        }

        let raw = self
            .send_signed(Method::POST, "/api/v4/withdrawals", "", Some(body))
            .await?;
        let ack: GateWithdrawAck =
            serde_json::from_value(raw).unwrap_or(GateWithdrawAck { id: None });
        debug!(exchange = EXCHANGE, reference = ?ack.id, "Withdrawal accepted");
        Ok(WithdrawalResult::accepted(ack.id))
    }
}
