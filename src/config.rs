//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for credentials (`MEXC_API_KEY`, `OKX_PASSPHRASE`, ...), so
//! secrets can stay out of the file entirely. Missing credentials for the
//! selected exchange are a fatal configuration error raised before any
//! connector is constructed.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::port::outbound::connector::{Credentials, ExchangeId};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub exchanges: ExchangesConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchConfig {
    /// CSV file with one withdrawal target per row.
    #[serde(default = "default_targets_file")]
    pub targets_file: PathBuf,
}

fn default_targets_file() -> PathBuf {
    PathBuf::from("addresses.csv")
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            targets_file: default_targets_file(),
        }
    }
}

/// Credentials as they appear in the config file; validated only when the
/// exchange is actually selected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub passphrase: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangesConfig {
    pub mexc: Option<CredentialsConfig>,
    pub binance: Option<CredentialsConfig>,
    pub okx: Option<CredentialsConfig>,
    pub bitget: Option<CredentialsConfig>,
    pub gate: Option<CredentialsConfig>,
}

impl ExchangesConfig {
    fn entry(&self, id: ExchangeId) -> Option<&CredentialsConfig> {
        match id {
            ExchangeId::Mexc => self.mexc.as_ref(),
            ExchangeId::Binance => self.binance.as_ref(),
            ExchangeId::Okx => self.okx.as_ref(),
            ExchangeId::Bitget => self.bitget.as_ref(),
            ExchangeId::Gate => self.gate.as_ref(),
        }
    }

    fn entry_mut(&mut self, id: ExchangeId) -> &mut CredentialsConfig {
        let slot = match id {
            ExchangeId::Mexc => &mut self.mexc,
            ExchangeId::Binance => &mut self.binance,
            ExchangeId::Okx => &mut self.okx,
            ExchangeId::Bitget => &mut self.bitget,
            ExchangeId::Gate => &mut self.gate,
        };
        slot.get_or_insert_with(CredentialsConfig::default)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override credential fields from the environment
    /// (`<EXCHANGE>_API_KEY`, `<EXCHANGE>_API_SECRET`, `<EXCHANGE>_PASSPHRASE`).
    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        for id in ExchangeId::ALL {
            let prefix = id.name().to_uppercase();
            if let Some(key) = get(&format!("{prefix}_API_KEY")) {
                self.exchanges.entry_mut(id).api_key = key;
            }
            if let Some(secret) = get(&format!("{prefix}_API_SECRET")) {
                self.exchanges.entry_mut(id).api_secret = secret;
            }
            if let Some(passphrase) = get(&format!("{prefix}_PASSPHRASE")) {
                self.exchanges.entry_mut(id).passphrase = Some(passphrase);
            }
        }
    }

    /// Credentials for `id`, validated for completeness.
    pub fn credentials_for(&self, id: ExchangeId) -> Result<Credentials> {
        let entry = self
            .exchanges
            .entry(id)
            .ok_or(ConfigError::MissingCredentials { exchange: id.name() })?;

        if entry.api_key.is_empty() || entry.api_secret.is_empty() {
            return Err(ConfigError::MissingCredentials { exchange: id.name() }.into());
        }
        if id.requires_passphrase() && entry.passphrase.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingField { field: "passphrase" }.into());
        }

        Ok(Credentials {
            api_key: entry.api_key.clone(),
            api_secret: entry.api_secret.clone(),
            passphrase: entry.passphrase.clone(),
        })
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}
