use thiserror::Error;

use crate::domain::error::ValidationError;

/// Configuration-related errors with structured variants.
///
/// These are fatal: they surface before any connector is constructed and
/// terminate the process with a non-zero status.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("no credentials configured for {exchange}")]
    MissingCredentials { exchange: &'static str },
}

/// Errors raised by an exchange connector.
///
/// Every variant carries the exchange name so per-item failures in a batch
/// are attributable without inspecting connector internals.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("{exchange}: failed to fetch coin metadata: {reason}")]
    MetadataFetch {
        exchange: &'static str,
        reason: String,
    },

    #[error("{exchange}: failed to fetch {coin} balance: {reason}")]
    BalanceFetch {
        exchange: &'static str,
        coin: String,
        reason: String,
    },

    /// The exchange refused the withdrawal; `reason` is the raw exchange text.
    #[error("{exchange}: withdrawal rejected: {reason}")]
    WithdrawalRejected {
        exchange: &'static str,
        reason: String,
    },

    #[error("{exchange}: transport error: {source}")]
    Transport {
        exchange: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response; `body` is the raw response payload.
    #[error("{exchange}: API error (HTTP {status}): {body}")]
    Api {
        exchange: &'static str,
        status: u16,
        body: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read batch input: {0}")]
    BatchInput(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}
