//! Bitget connector.
//!
//! Bitget signs like OKX — `base64(HMAC-SHA256(secret, timestamp + METHOD +
//! path + body))` in an `ACCESS-SIGN` header with key, millisecond
//! timestamp, and passphrase alongside — but keeps its coin catalogue on a
//! public endpoint. There is no status poll; the submission ack is all the
//! exchange offers immediately.

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

const EXCHANGE: &str = "Bitget";
const OK_CODE: &str = "00000";

/// Production REST host.
pub const DEFAULT_HOST: &str = "https://api.bitget.com";

#[derive(Debug, Deserialize)]
struct BitgetEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct BitgetCoin {
    coin: String,
    #[serde(default)]
    chains: Vec<BitgetChain>,
}

#[derive(Debug, Deserialize)]
struct BitgetChain {
    chain: String,
    #[serde(default)]
    withdrawable: String,
    #[serde(rename = "withdrawFee", default)]
    withdraw_fee: Option<String>,
    #[serde(rename = "minWithdrawAmount", default)]
    min_withdraw_amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BitgetAsset {
    coin: String,
    available: String,
}

#[derive(Debug, Deserialize)]
struct BitgetWithdrawAck {
    #[serde(rename = "orderId")]
    order_id: Option<String>,
}

fn parse_decimal(raw: &str) -> Decimal {
    raw.parse().unwrap_or_default()
}

fn coin_info_from(raw: BitgetCoin) -> Option<CoinInfo> {
    let networks: Vec<NetworkInfo> = raw
        .chains
        .into_iter()
        .filter(|c| c.withdrawable == "true")
        .map(|c| NetworkInfo {
            id: c.chain,
            withdraw_fee: c
                .withdraw_fee
                .as_deref()
                .map(parse_decimal)
                .unwrap_or_default(),
            withdraw_min: c.min_withdraw_amount.as_deref().map(parse_decimal),
        })
        .collect();

    (!networks.is_empty()).then_some(CoinInfo {
        coin: raw.coin,
        networks,
    })
}

/// Bitget exchange connector.
pub struct BitgetConnector {
    http: HttpClient,
    host: String,
    api_key: String,
    api_secret: String,
    passphrase: String,
}

impl BitgetConnector {
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

    async fn send_public(&self, path: &str) -> Result<BitgetEnvelope, ConnectorError> {
        let response = self
            .http
            .get(format!("{}{}", self.host, path))
            .send()
            .await
            .map_err(|source| transport(EXCHANGE, source))?;
        Self::unwrap_envelope(read_json(EXCHANGE, response).await?)
    }

    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<BitgetEnvelope, ConnectorError> {
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let body_text = body.map(|b| b.to_string()).unwrap_or_default();
        let signature = self.sign(&timestamp, &method, path, &body_text);

        let mut request = self
            .http
            .request(method, format!("{}{}", self.host, path))
            .header("ACCESS-KEY", &self.api_key)
            .header("ACCESS-SIGN", signature)
            .header("ACCESS-TIMESTAMP", timestamp)
            .header("ACCESS-PASSPHRASE", &self.passphrase)
            .header("Content-Type", "application/json");
        if !body_text.is_empty() {
            request = request.body(body_text);
        }

        let response = request
            .send()
            .await
            .map_err(|source| transport(EXCHANGE, source))?;
        Self::unwrap_envelope(read_json(EXCHANGE, response).await?)
    }

    fn unwrap_envelope(raw: serde_json::Value) -> Result<BitgetEnvelope, ConnectorError> {
        serde_json::from_value(raw).map_err(|err| ConnectorError::Api {
            exchange: EXCHANGE,
            status: 200,
            body: format!("unexpected response shape: {err}"),
        })
    }
}

#[async_trait]
impl ExchangeConnector for BitgetConnector {
    fn name(&self) -> &'static str {
        EXCHANGE
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::DeductedFromAmount
    }

    async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError> {
        let envelope = self.send_public("/api/v2/spot/public/coins").await?;
        if envelope.code != OK_CODE {
            return Err(ConnectorError::MetadataFetch {
                exchange: EXCHANGE,
                reason: envelope.msg,
            });
        }
        let coins: Vec<BitgetCoin> =
            serde_json::from_value(envelope.data).map_err(|err| ConnectorError::MetadataFetch {
                exchange: EXCHANGE,
                reason: err.to_string(),
            })?;

        let infos: Vec<CoinInfo> = coins.into_iter().filter_map(coin_info_from).collect();
        debug!(exchange = EXCHANGE, coins = infos.len(), "Fetched coin metadata");
        Ok(infos)
    }

    async fn available_balance(&self, coin: &str) -> Result<Decimal, ConnectorError> {
        let path = format!("/api/v2/spot/account/assets?coin={coin}");
        let envelope = self.send_signed(Method::GET, &path, None).await?;
        if envelope.code != OK_CODE {
            return Err(ConnectorError::BalanceFetch {
                exchange: EXCHANGE,
                coin: coin.to_string(),
                reason: envelope.msg,
            });
        }
        let assets: Vec<BitgetAsset> =
            serde_json::from_value(envelope.data).map_err(|err| ConnectorError::BalanceFetch {
                exchange: EXCHANGE,
                coin: coin.to_string(),
                reason: err.to_string(),
            })?;

        assets
            .iter()
            .find(|a| a.coin.eq_ignore_ascii_case(coin))
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
            "coin": request.coin,
            "transferType": "on_chain",
            "address": request.address,
            "chain": request.network,
            "size": normalized.to_string(),
        });
        if let Some(memo) = &request.memo {
            body["tag"] = serde_json::Value::String(memo.clone());
        }
        if let Some(id) = &request.client_order_id {
            body["clientOid"] = serde_json::Value::String(id.clone());
        }
        if let Some(remark) = &request.remark {
            body["remark"] = serde_json::Value::String(remark.clone());
        }

        let envelope = self
            .send_signed(Method::POST, "/api/v2/spot/wallet/withdrawal", Some(body))
            .await?;
        if envelope.code != OK_CODE {
            return Err(ConnectorError::WithdrawalRejected {
                exchange: EXCHANGE,
                reason: envelope.msg,
            });
        }

        let ack: BitgetWithdrawAck =
            serde_json::from_value(envelope.data).unwrap_or(BitgetWithdrawAck { order_id: None });
        debug!(exchange = EXCHANGE, reference = ?ack.order_id, "Withdrawal accepted");
        Ok(WithdrawalResult::accepted(ack.order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn chains_flagged_unwithdrawable_are_dropped() {
        let coin = BitgetCoin {
            coin: "USDT".into(),
            chains: vec![
                BitgetChain {
                    chain: "BEP20".into(),
                    withdrawable: "true".into(),
                    withdraw_fee: Some("0.3".into()),
                    min_withdraw_amount: Some("5".into()),
                },
                BitgetChain {
                    chain: "ERC20".into(),
                    withdrawable: "false".into(),
                    withdraw_fee: Some("2.5".into()),
                    min_withdraw_amount: None,
                },
            ],
        };

        let info = coin_info_from(coin).unwrap();
        assert_eq!(info.network_ids(), vec!["BEP20"]);
        assert_eq!(info.networks[0].withdraw_fee, dec!(0.3));
        assert_eq!(info.networks[0].withdraw_min, Some(dec!(5)));
    }

    #[test]
    fn coins_with_no_withdrawable_chain_are_dropped() {
        let coin = BitgetCoin {
            coin: "DEAD".into(),
            chains: vec![BitgetChain {
                chain: "X".into(),
                withdrawable: "false".into(),
                withdraw_fee: None,
                min_withdraw_amount: None,
            }],
        };
        assert!(coin_info_from(coin).is_none());
    }

    #[test]
    fn signature_is_base64_encoded() {
        let connector = BitgetConnector::with_host(
            &Credentials {
                api_key: "key".into(),
                api_secret: "secret".into(),
                passphrase: Some("phrase".into()),
            },
            "https://example.test",
        );
        let sig = connector.sign("1700000000000", &Method::POST, "/api/v2/spot/wallet/withdrawal", "{}");
        assert_eq!(BASE64.decode(&sig).unwrap().len(), 32);
    }
}
