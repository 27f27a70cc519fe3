//! Coin and network metadata fetched from an exchange.

use rust_decimal::Decimal;

/// One withdraw-enabled chain a coin can be sent over.
///
/// Connectors only construct entries for networks the exchange flags as
/// withdraw-enabled, so presence in [`CoinInfo::networks`] implies the
/// network accepts withdrawals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Exchange-facing network identifier (e.g. `"BSC"`, `"ERC20"`).
    pub id: String,
    /// Fee charged for withdrawing over this network.
    pub withdraw_fee: Decimal,
    /// Minimum withdrawal amount, when the exchange declares one.
    pub withdraw_min: Option<Decimal>,
}

/// A coin and the networks it can be withdrawn over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinInfo {
    /// Coin ticker as the exchange reports it (e.g. `"USDT"`).
    pub coin: String,
    /// Withdraw-enabled networks, in the order the exchange listed them.
    pub networks: Vec<NetworkInfo>,
}

impl CoinInfo {
    /// Look up a network by id.
    #[must_use]
    pub fn network(&self, id: &str) -> Option<&NetworkInfo> {
        self.networks.iter().find(|n| n.id == id)
    }

    /// Network identifiers in listing order.
    #[must_use]
    pub fn network_ids(&self) -> Vec<&str> {
        self.networks.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Find a coin in a metadata snapshot, case-insensitively.
#[must_use]
pub fn find_coin<'a>(coins: &'a [CoinInfo], coin: &str) -> Option<&'a CoinInfo> {
    coins.iter().find(|c| c.coin.eq_ignore_ascii_case(coin))
}
