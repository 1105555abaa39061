//! Error types for the BTC info widget

use crate::{constants::FETCH_ERROR_MESSAGE, types::DataSource};
use thiserror::Error;

/// Errors that can occur during one refresh cycle
///
/// Every variant fails the whole cycle. Callers that only need the
/// user-visible text should use [`FetchError::user_message`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,

    /// Endpoint answered with a non-success status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Endpoint answered with an empty body
    #[error("Empty response from {0}")]
    EmptyResponse(DataSource),

    /// Body was not the expected JSON shape
    #[error("Malformed data from {data_source}: {message}")]
    MalformedData {
        data_source: DataSource,
        message: String,
    },

    /// Values parsed but cannot be used (e.g. non-positive price)
    #[error("Domain error: {0}")]
    Domain(String),
}

impl FetchError {
    /// Creates a MalformedData error
    pub fn malformed(data_source: DataSource, message: impl Into<String>) -> Self {
        Self::MalformedData {
            data_source,
            message: message.into(),
        }
    }

    /// Creates a Domain error
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    /// The text shown to the user for any failed cycle
    pub fn user_message(&self) -> &'static str {
        FETCH_ERROR_MESSAGE
    }
}

/// Errors that can occur while loading or applying configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Currency code outside the supported list
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Interval outside the supported set of second-counts
    #[error("Unsupported refresh interval: {0}s")]
    UnsupportedInterval(u64),

    /// Environment override is not a valid value
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_fetch_error_collapses_to_one_message() {
        let errors = [
            FetchError::Timeout,
            FetchError::HttpStatus(503),
            FetchError::EmptyResponse(DataSource::Fees),
            FetchError::malformed(DataSource::Price, "missing field `amount`"),
            FetchError::domain("price must be positive"),
        ];

        for err in &errors {
            assert_eq!(err.user_message(), FETCH_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_malformed_names_source() {
        let err = FetchError::malformed(DataSource::Hashrate, "expected number");
        assert_eq!(
            err.to_string(),
            "Malformed data from hashrate: expected number"
        );
    }
}
