//! One destination of a batch run.

use serde::Deserialize;

/// A single withdrawal destination: one row of the batch input file.
///
/// Only the address is required. Empty optional columns deserialize to
/// `None` so connectors can omit the corresponding request parameters.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WithdrawalTarget {
    /// Destination address.
    #[serde(alias = "add")]
    pub address: String,

    /// Destination tag / memo for chains that require one.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub memo: Option<String>,

    /// Caller-supplied order id, forwarded to exchanges that accept one.
    #[serde(default, alias = "id", deserialize_with = "empty_as_none")]
    pub client_order_id: Option<String>,

    /// Free-form note, forwarded to exchanges that accept one.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub remark: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
