//! OKX connector.
//!
//! OKX authenticates with headers rather than query parameters: the
//! signature is `base64(HMAC-SHA256(secret, timestamp + METHOD + path +
//! body))` and rides `OK-ACCESS-SIGN` next to the key, an ISO-8601
//! timestamp, and the account passphrase.
//!
//! Two quirks carried over from OKX's withdrawal semantics:
//! - a destination memo is concatenated into the address as
//!   `"{address}:{memo}"` instead of being a separate parameter;
//! - the network fee must be passed explicitly with the request, and the
//!   balance has to cover `amount + fee`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
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

const EXCHANGE: &str = "OKX";

/// Production REST host.
pub const DEFAULT_HOST: &str = "https://www.okx.com";

#[derive(Debug, Deserialize)]
struct OkxEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OkxCurrency {
    ccy: String,
    chain: String,
    #[serde(rename = "canWd", default)]
    can_withdraw: bool,
    #[serde(rename = "minWd", default)]
    min_withdrawal: Option<String>,
    #[serde(rename = "minFee", default)]
    min_fee: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OkxBalance {
    ccy: String,
    #[serde(rename = "availBal")]
    available: String,
}

#[derive(Debug, Deserialize)]
struct OkxWithdrawAck {
    #[serde(rename = "wdId")]
    wd_id: Option<String>,
}

fn parse_decimal(raw: &str) -> Decimal {
    raw.parse().unwrap_or_default()
}

/// Group per-chain currency rows into one [`CoinInfo`] per coin, keeping
/// only withdraw-enabled chains and the exchange's listing order.
fn group_currencies(rows: Vec<OkxCurrency>) -> Vec<CoinInfo> {
    let mut infos: Vec<CoinInfo> = Vec::new();
    for row in rows {
        if !row.can_withdraw {
            continue;
        }
        let network = NetworkInfo {
            id: row.chain,
            withdraw_fee: row.min_fee.as_deref().map(parse_decimal).unwrap_or_default(),
            withdraw_min: row.min_withdrawal.as_deref().map(parse_decimal),
        };
        match infos.iter().position(|c| c.coin == row.ccy) {
            Some(pos) => infos[pos].networks.push(network),
            None => infos.push(CoinInfo {
                coin: row.ccy,
                networks: vec![network],
            }),
        }
    }
    infos
}

/// OKX exchange connector.
pub struct OkxConnector {
    http: HttpClient,
    host: String,
    api_key: String,
    api_secret: String,
    passphrase: String,
}

impl OkxConnector {
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
            passphrase: credentials.passphrase.clone().unwrap_or_default(),
        }
    }

    fn sign(&self, timestamp: &str, method: &Method, path: &str, body: &str) -> String {
        let payload = format!("{timestamp}{}{path}{body}", method.as_str());
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ConnectorError> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        let body_text = body.map(|b| b.to_string()).unwrap_or_default();
        let signature = self.sign(&timestamp, &method, path, &body_text);

        let mut request = self
            .http
            .request(method, format!("{}{}", self.host, path))
            .header("OK-ACCESS-KEY", &self.api_key)
            .header("OK-ACCESS-SIGN", signature)
            .header("OK-ACCESS-TIMESTAMP", timestamp)
            .header("OK-ACCESS-PASSPHRASE", &self.passphrase)
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

    fn unwrap_envelope(raw: serde_json::Value) -> Result<OkxEnvelope, ConnectorError> {
        let envelope: OkxEnvelope =
            serde_json::from_value(raw).map_err(|err| ConnectorError::Api {
                exchange: EXCHANGE,
                status: 200,
                body: format!("unexpected response shape: {err}"),
            })?;
        Ok(envelope)
    }

    async fn fetch_currencies(&self) -> Result<Vec<OkxCurrency>, ConnectorError> {
        let raw = self
            .send_signed(Method::GET, "/api/v5/asset/currencies", None)
            .await?;
        let envelope = Self::unwrap_envelope(raw)?;
        if envelope.code != "0" {
            return Err(ConnectorError::MetadataFetch {
                exchange: EXCHANGE,
                reason: envelope.msg,
            });
        }
        serde_json::from_value(envelope.data).map_err(|err| ConnectorError::MetadataFetch {
            exchange: EXCHANGE,
            reason: err.to_string(),
        })
    }

    /// Fee for withdrawing `coin` over `chain`, from live currency metadata.
    async fn withdrawal_fee(&self, coin: &str, chain: &str) -> Result<Decimal, ConnectorError> {
        let rows = self.fetch_currencies().await?;
        rows.iter()
            .find(|row| row.ccy.eq_ignore_ascii_case(coin) && row.chain == chain)
            .and_then(|row| row.min_fee.as_deref().map(parse_decimal))
            .ok_or_else(|| ConnectorError::MetadataFetch {
                exchange: EXCHANGE,
                reason: format!("no fee metadata for {coin} on {chain}"),
            })
    }
}

#[async_trait]
impl ExchangeConnector for OkxConnector {
    fn name(&self) -> &'static str {
        EXCHANGE
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::ChargedOnTop
    }

    async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError> {
        let infos = group_currencies(self.fetch_currencies().await?);
        debug!(exchange = EXCHANGE, coins = infos.len(), "Fetched coin metadata");
        Ok(infos)
    }

    async fn available_balance(&self, coin: &str) -> Result<Decimal, ConnectorError> {
        let path = format!("/api/v5/asset/balances?ccy={coin}");
        let raw = self.send_signed(Method::GET, &path, None).await?;
        let envelope = Self::unwrap_envelope(raw)?;
        if envelope.code != "0" {
            return Err(ConnectorError::BalanceFetch {
                exchange: EXCHANGE,
                coin: coin.to_string(),
                reason: envelope.msg,
            });
        }
        let balances: Vec<OkxBalance> =
            serde_json::from_value(envelope.data).map_err(|err| ConnectorError::BalanceFetch {
                exchange: EXCHANGE,
                coin: coin.to_string(),
                reason: err.to_string(),
            })?;

        balances
            .iter()
            .find(|b| b.ccy.eq_ignore_ascii_case(coin))
            .map(|b| parse_decimal(&b.available))
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
        let fee = self.withdrawal_fee(&request.coin, &request.network).await?;

        // OKX takes the memo inside the address field, colon-separated.
        let to_addr = match &request.memo {
            Some(memo) => format!("{}:{memo}", request.address),
            None => request.address.clone(),
        };

        let body = serde_json::json!({
            "ccy": request.coin,
            "amt": normalized.to_string(),
            "dest": "4",
            "toAddr": to_addr,
            "fee": fee.to_string(),
            "chain": request.network,
        });

        let raw = self
            .send_signed(Method::POST, "/api/v5/asset/withdrawal", Some(body))
            .await?;
        let envelope = Self::unwrap_envelope(raw)?;
        if envelope.code != "0" {
            return Err(ConnectorError::WithdrawalRejected {
                exchange: EXCHANGE,
                reason: envelope.msg,
            });
        }

        let acks: Vec<OkxWithdrawAck> =
            serde_json::from_value(envelope.data).unwrap_or_default();
        let reference = acks.into_iter().next().and_then(|a| a.wd_id);
        debug!(exchange = EXCHANGE, reference = ?reference, "Withdrawal accepted");
        Ok(WithdrawalResult::accepted(reference))
    }

    fn supports_status_poll(&self) -> bool {
        true
    }

    async fn poll_status(
        &self,
        _coin: &str,
        reference: &str,
    ) -> Result<Option<serde_json::Value>, ConnectorError> {
        let path = format!("/api/v5/asset/deposit-withdraw-status?wdId={reference}");
        let raw = self.send_signed(Method::GET, &path, None).await?;
        let envelope = Self::unwrap_envelope(raw)?;
        if envelope.code != "0" {
            return Ok(None);
        }
        Ok(envelope.data.as_array().and_then(|rows| rows.first().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn connector() -> OkxConnector {
        OkxConnector::with_host(
            &Credentials {
                api_key: "key".into(),
                api_secret: "secret".into(),
                passphrase: Some("phrase".into()),
            },
            "https://example.test",
        )
    }

    #[test]
    fn signature_is_base64_over_timestamp_method_path_body() {
        let sig = connector().sign(
            "2024-01-01T00:00:00.000Z",
            &Method::GET,
            "/api/v5/asset/currencies",
            "",
        );
        assert!(BASE64.decode(&sig).is_ok());
        assert_eq!(BASE64.decode(&sig).unwrap().len(), 32);
    }

    #[test]
    fn grouping_folds_chains_under_one_coin() {
        let rows = vec![
            OkxCurrency {
                ccy: "USDT".into(),
                chain: "USDT-ERC20".into(),
                can_withdraw: true,
                min_withdrawal: Some("2".into()),
                min_fee: Some("1.2".into()),
            },
            OkxCurrency {
                ccy: "USDT".into(),
                chain: "USDT-TRC20".into(),
                can_withdraw: true,
                min_withdrawal: None,
                min_fee: Some("0.8".into()),
            },
            OkxCurrency {
                ccy: "USDT".into(),
                chain: "USDT-Omni".into(),
                can_withdraw: false,
                min_withdrawal: None,
                min_fee: None,
            },
        ];

        let infos = group_currencies(rows);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].network_ids(), vec!["USDT-ERC20", "USDT-TRC20"]);
        assert_eq!(infos[0].networks[0].withdraw_fee, dec!(1.2));
        assert_eq!(infos[0].networks[0].withdraw_min, Some(dec!(2)));
    }

    #[test]
    fn disabled_only_coins_are_dropped() {
        let rows = vec![OkxCurrency {
            ccy: "DEAD".into(),
            chain: "DEAD-X".into(),
            can_withdraw: false,
            min_withdrawal: None,
            min_fee: None,
        }];
        assert!(group_currencies(rows).is_empty());
    }
}
