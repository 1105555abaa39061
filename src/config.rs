//! Runtime configuration
//!
//! Settings are read from an optional TOML file and then overridden by
//! environment variables. Every field has a default, so no file is needed.

use crate::{
    constants::{COINBASE_API_URL, MEMPOOL_API_URL, REQUEST_TIMEOUT_SECS},
    endpoints::EndpointSet,
    error::ConfigError,
    types::{Currency, RefreshInterval},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "btc-info.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "BTC_INFO_CONFIG";

/// Environment variable overriding the quote currency
pub const CURRENCY_ENV: &str = "BTC_INFO_CURRENCY";

/// Environment variable overriding the refresh interval (seconds)
pub const INTERVAL_ENV: &str = "BTC_INFO_INTERVAL";

/// Raw file contents before validation
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
struct FileConfig {
    currency: String,
    interval_secs: u64,
    request_timeout_secs: u64,
    coinbase_base_url: String,
    mempool_base_url: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default().code().to_string(),
            interval_secs: RefreshInterval::default().secs(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            coinbase_base_url: COINBASE_API_URL.to_string(),
            mempool_base_url: MEMPOOL_API_URL.to_string(),
        }
    }
}

/// Validated application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub currency: Currency,
    pub interval: RefreshInterval,
    pub request_timeout: Duration,
    pub coinbase_base_url: String,
    pub mempool_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            interval: RefreshInterval::default(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            coinbase_base_url: COINBASE_API_URL.to_string(),
            mempool_base_url: MEMPOOL_API_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the config file (if any) and applies environment overrides
    ///
    /// The file is taken from `BTC_INFO_CONFIG` when set, otherwise
    /// `btc-info.toml` in the working directory. A missing default file is
    /// not an error; a missing file named explicitly is.
    pub fn load() -> Result<Self, ConfigError> {
        let (path, explicit) = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let file = if explicit || path.exists() {
            Self::read_file(&path)?
        } else {
            FileConfig::default()
        };

        Self::from_file_config(file, |key| std::env::var(key).ok())
    }

    /// Parses TOML text without environment overrides
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content)?;
        Self::from_file_config(file, |_| None)
    }

    /// Endpoint set for the configured currency and hosts
    pub fn endpoints(&self) -> EndpointSet {
        EndpointSet::with_base_urls(
            self.currency,
            &self.coinbase_base_url,
            &self.mempool_base_url,
        )
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let file = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(file)
    }

    fn from_file_config(
        mut file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(currency) = env(CURRENCY_ENV) {
            file.currency = currency;
        }
        if let Some(interval) = env(INTERVAL_ENV) {
            file.interval_secs = interval.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: INTERVAL_ENV,
                value: interval.clone(),
            })?;
        }

        Ok(Self {
            currency: file.currency.parse()?,
            interval: RefreshInterval::try_from(file.interval_secs)?,
            request_timeout: Duration::from_secs(file.request_timeout_secs.max(1)),
            coinbase_base_url: file.coinbase_base_url,
            mempool_base_url: file.mempool_base_url,
        })
    }
}
