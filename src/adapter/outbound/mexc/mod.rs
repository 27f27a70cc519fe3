//! MEXC connector, built on the bespoke [`signing`] client.
//!
//! Unlike the other exchanges, every MEXC call here is hand-assembled:
//! capital metadata, spot account balance, and the withdrawal endpoints all
//! ride the signed query protocol in [`signing`].

pub mod signing;

use async_trait::async_trait;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::{
    amount, CoinInfo, FeePolicy, NetworkInfo, WithdrawalRequest, WithdrawalResult,
    DEFAULT_PRECISION,
};
use crate::error::ConnectorError;
use crate::port::outbound::connector::{Credentials, ExchangeConnector};

use signing::{SigningClient, EXCHANGE};

#[derive(Debug, Deserialize)]
struct MexcCoin {
    coin: String,
    #[serde(rename = "networkList", default)]
    network_list: Vec<MexcNetwork>,
}

#[derive(Debug, Deserialize)]
struct MexcNetwork {
    #[serde(rename = "netWork", alias = "network")]
    network: String,
    #[serde(rename = "withdrawEnable", default)]
    withdraw_enable: bool,
    #[serde(rename = "withdrawFee", default)]
    withdraw_fee: Option<String>,
    #[serde(rename = "withdrawMin", default)]
    withdraw_min: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MexcAccount {
    #[serde(default)]
    balances: Vec<MexcBalance>,
}

#[derive(Debug, Deserialize)]
struct MexcBalance {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
struct MexcWithdrawAck {
    id: Option<String>,
}

fn parse_decimal(raw: &str) -> Decimal {
    raw.parse().unwrap_or_default()
}

fn coin_info_from(raw: MexcCoin) -> Option<CoinInfo> {
    let networks: Vec<NetworkInfo> = raw
        .network_list
        .into_iter()
        .filter(|n| n.withdraw_enable)
        .map(|n| NetworkInfo {
            id: n.network,
            withdraw_fee: n.withdraw_fee.as_deref().map(parse_decimal).unwrap_or_default(),
            withdraw_min: n.withdraw_min.as_deref().map(parse_decimal),
        })
        .collect();

    if networks.is_empty() {
        return None;
    }
    Some(CoinInfo {
        coin: raw.coin,
        networks,
    })
}

/// Withdrawal parameters in the order MEXC expects them signed.
fn withdraw_params(request: &WithdrawalRequest, amount: Decimal) -> Vec<(String, String)> {
    let mut params = vec![
        ("coin".to_string(), request.coin.clone()),
        ("address".to_string(), request.address.clone()),
        ("amount".to_string(), amount.to_string()),
        ("netWork".to_string(), request.network.clone()),
    ];
    if let Some(memo) = &request.memo {
        params.push(("memo".to_string(), memo.clone()));
    }
    if let Some(id) = &request.client_order_id {
        params.push(("withdrawOrderId".to_string(), id.clone()));
    }
    if let Some(remark) = &request.remark {
        params.push(("remark".to_string(), remark.clone()));
    }
    params
}

/// MEXC exchange connector.
pub struct MexcConnector {
    client: SigningClient,
}

impl MexcConnector {
    /// Connect and verify API reachability with a server-time probe.
    pub async fn connect(credentials: &Credentials) -> Result<Self, ConnectorError> {
        let client = SigningClient::new(credentials);
        let server_time = client.server_time().await?;
        info!(exchange = EXCHANGE, server_time, "API connection verified");
        Ok(Self { client })
    }

    /// Build against a non-default host. Skips the connectivity probe.
    #[must_use]
    pub fn with_host(credentials: &Credentials, host: impl Into<String>) -> Self {
        Self {
            client: SigningClient::with_host(credentials, host),
        }
    }

    /// Recent withdrawal records, optionally filtered by coin.
    pub async fn withdraw_history(
        &self,
        coin: Option<&str>,
    ) -> Result<serde_json::Value, ConnectorError> {
        let params = coin
            .map(|c| vec![("coin".to_string(), c.to_string())])
            .unwrap_or_default();
        self.client
            .send(Method::GET, "/api/v3/capital/withdraw/history", params)
            .await
    }

    /// Cancel a pending withdrawal by its exchange id.
    pub async fn cancel_withdrawal(&self, id: &str) -> Result<serde_json::Value, ConnectorError> {
        self.client
            .send(
                Method::DELETE,
                "/api/v3/capital/withdraw",
                vec![("id".to_string(), id.to_string())],
            )
            .await
    }
}

#[async_trait]
impl ExchangeConnector for MexcConnector {
    fn name(&self) -> &'static str {
        EXCHANGE
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::DeductedFromAmount
    }

    async fn list_coin_networks(&self) -> Result<Vec<CoinInfo>, ConnectorError> {
        let raw = self
            .client
            .send(Method::GET, "/api/v3/capital/config/getall", Vec::new())
            .await?;
        let coins: Vec<MexcCoin> =
            serde_json::from_value(raw).map_err(|err| ConnectorError::MetadataFetch {
                exchange: EXCHANGE,
                reason: err.to_string(),
            })?;

        let infos: Vec<CoinInfo> = coins.into_iter().filter_map(coin_info_from).collect();
        debug!(exchange = EXCHANGE, coins = infos.len(), "Fetched coin metadata");
        Ok(infos)
    }

    async fn available_balance(&self, coin: &str) -> Result<Decimal, ConnectorError> {
        let raw = self
            .client
            .send(Method::GET, "/api/v3/account", Vec::new())
            .await?;
        let account: MexcAccount =
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

        let raw = self
            .client
            .send(
                Method::POST,
                "/api/v3/capital/withdraw/apply",
                withdraw_params(request, normalized),
            )
            .await?;

        let ack: MexcWithdrawAck =
            serde_json::from_value(raw).unwrap_or(MexcWithdrawAck { id: None });
        debug!(exchange = EXCHANGE, reference = ?ack.id, "Withdrawal accepted");
        Ok(WithdrawalResult::accepted(ack.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request_with_extras() -> WithdrawalRequest {
        WithdrawalRequest {
            coin: "USDT".into(),
            network: "BSC".into(),
            address: "0xabc".into(),
            amount: dec!(1.23456789),
            memo: Some("tag-1".into()),
            client_order_id: Some("order-9".into()),
            remark: Some("note".into()),
        }
    }

    #[test]
    fn withdraw_params_follow_insertion_order() {
        let params = withdraw_params(&request_with_extras(), dec!(1.23456));
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "coin",
                "address",
                "amount",
                "netWork",
                "memo",
                "withdrawOrderId",
                "remark"
            ]
        );
    }

    #[test]
    fn withdraw_params_omit_absent_optionals() {
        let request = WithdrawalRequest {
            memo: None,
            client_order_id: None,
            remark: None,
            ..request_with_extras()
        };
        let params = withdraw_params(&request, dec!(2));
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["coin", "address", "amount", "netWork"]);
    }

    #[test]
    fn coin_metadata_keeps_only_withdraw_enabled_networks() {
        let raw: Vec<MexcCoin> = serde_json::from_value(serde_json::json!([
            {
                "coin": "USDT",
                "networkList": [
                    {"netWork": "BSC", "withdrawEnable": true, "withdrawFee": "0.3", "withdrawMin": "1"},
                    {"netWork": "ERC20", "withdrawEnable": false, "withdrawFee": "2.5"}
                ]
            },
            {
                "coin": "DEAD",
                "networkList": [
                    {"netWork": "X", "withdrawEnable": false}
                ]
            }
        ]))
        .unwrap();

        let infos: Vec<CoinInfo> = raw.into_iter().filter_map(coin_info_from).collect();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].coin, "USDT");
        assert_eq!(infos[0].network_ids(), vec!["BSC"]);
        assert_eq!(infos[0].networks[0].withdraw_fee, dec!(0.3));
        assert_eq!(infos[0].networks[0].withdraw_min, Some(dec!(1)));
    }
}
