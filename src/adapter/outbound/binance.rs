//! Binance connector.
//!
//! Binance signs requests the same way its spot API always has: the full
//! query string plus a local-clock `timestamp`, HMAC-SHA256, signature
//! appended as the final query parameter and the API key in `X-MBX-APIKEY`.
//! Binance deducts the network fee from the transferred amount, so the
//! balance only needs to cover the amount itself. The memo travels as the
//! `addressTag` parameter.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client as HttpClient, Method};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use crate::adapter::outbound::http::{read_json, transport};
use crate::domain::{
    amount, CoinInfo, FeePolicy, NetworkInfo, WithdrawalRequest, WithdrawalResult,
    DEFAULT_PRECISION,
};
use crate::error::ConnectorError;
use crate::port::outbound::connector::{Credentials, ExchangeConnector};

type HmacSha256 = Hmac<Sha256>;

const EXCHANGE: &str = "Binance";

/// Production REST host.
pub const DEFAULT_HOST: &str = "https://api.binance.com";

#[derive(Debug, Deserialize)]
struct BinanceCoin {
    coin: String,
    #[serde(rename = "networkList", default)]
    network_list: Vec<BinanceNetwork>,
}

#[derive(Debug, Deserialize)]
struct BinanceNetwork {
    network: String,
    #[serde(rename = "withdrawEnable", default)]
    withdraw_enable: bool,
    #[serde(rename = "withdrawFee", default)]
    withdraw_fee: Option<String>,
    #[serde(rename = "withdrawMin", default)]
    withdraw_min: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BinanceAccount {
    #[serde(default)]
    balances: Vec<BinanceBalance>,
}

#[derive(Debug, Deserialize)]
struct BinanceBalance {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
struct BinanceWithdrawAck {
    id: Option<String>,
}

fn parse_decimal(raw: &str) -> Decimal {
    raw.parse().unwrap_or_default()
}

/// Binance exchange connector.
pub struct BinanceConnector {
    http: HttpClient,
    host: String,
    api_key: String,
    api_secret: String,
}

impl BinanceConnector {
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

    fn signed_url(&self, path: &str, params: &[(String, String)]) -> String {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut query: Vec<String> = params
            .iter()
            .map(|(key, value)| {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
                format!("{key}={encoded}")
            })
            .collect();
        query.push(format!("timestamp={timestamp}"));
        let canonical = query.join("&");

        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(canonical.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        format!("{}{}?{}&signature={}", self.host, path, canonical, signature)
    }

    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<serde_json::Value, ConnectorError> {
        let url = self.signed_url(path, &params);
        let response = self
            .http
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|source| transport(EXCHANGE, source))?;
        read_json(EXCHANGE, response).await
    }
}

#[async_trait]
impl ExchangeConnector for BinanceConnector {
    fn name(&self) -> &'static str {
        EXCHANGE
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::DeductedFromAmount
    }

    async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError> {
        let raw = self
            .send_signed(Method::GET, "/sapi/v1/capital/config/getall", Vec::new())
            .await?;
        let coins: Vec<BinanceCoin> =
            serde_json::from_value(raw).map_err(|err| ConnectorError::MetadataFetch {
                exchange: EXCHANGE,
                reason: err.to_string(),
            })?;

        let infos: Vec<CoinInfo> = coins
            .into_iter()
            .filter_map(|coin| {
                let networks: Vec<NetworkInfo> = coin
                    .network_list
                    .into_iter()
                    .filter(|n| n.withdraw_enable)
                    .map(|n| NetworkInfo {
                        id: n.network,
                        withdraw_fee: n
                            .withdraw_fee
                            .as_deref()
                            .map(parse_decimal)
                            .unwrap_or_default(),
                        withdraw_min: n.withdraw_min.as_deref().map(parse_decimal),
                    })
                    .collect();
                (!networks.is_empty()).then_some(CoinInfo {
                    coin: coin.coin,
                    networks,
                })
            })
            .collect();

        debug!(exchange = EXCHANGE, coins = infos.len(), "Fetched coin metadata");
        Ok(infos)
    }

    async fn available_balance(&self, coin: &str) -> Result<Decimal, ConnectorError> {
        let raw = self
            .send_signed(Method::GET, "/api/v3/account", Vec::new())
            .await?;
        let account: BinanceAccount =
            serde_json::from_value(raw).map_err(|err| ConnectorError::BalanceFetch {
                exchange: EXCHANGE,
                coin: coin.to_string(),
                reason: err.to_string(),
            })?;

        account
            .balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(coin))
            .map(|b| parse_decimal(&b.free))
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

        let mut params = vec![
            ("coin".to_string(), request.coin.clone()),
            ("address".to_string(), request.address.clone()),
            ("amount".to_string(), normalized.to_string()),
            ("network".to_string(), request.network.clone()),
        ];
        if let Some(memo) = &request.memo {
            params.push(("addressTag".to_string(), memo.clone()));
        }
        if let Some(id) = &request.client_order_id {
            params.push(("withdrawOrderId".to_string(), id.clone()));
        }

        let raw = self
            .send_signed(Method::POST, "/sapi/v1/capital/withdraw/apply", params)
            .await?;
        let ack: BinanceWithdrawAck =
            serde_json::from_value(raw).unwrap_or(BinanceWithdrawAck { id: None });
        debug!(exchange = EXCHANGE, reference = ?ack.id, "Withdrawal accepted");
        Ok(WithdrawalResult::accepted(ack.id))
    }

    fn supports_status_poll(&self) -> bool {
        true
    }

    async fn poll_status(
        &self,
        coin: &str,
        _reference: &str,
    ) -> Result<Option<serde_json::Value>, ConnectorError> {
        let params = vec![
            ("coin".to_string(), coin.to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        let raw = self
            .send_signed(Method::GET, "/sapi/v1/capital/withdraw/history", params)
            .await?;
        Ok(raw.as_array().and_then(|records| records.first().cloned()))
    }
}
