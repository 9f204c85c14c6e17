//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; every section is optional.
//! The ledger endpoints can be overridden from the environment:
//!
//! | Variable               | Overrides                |
//! |------------------------|--------------------------|
//! | `ODDSYNC_POOL_API_URL` | `ledger.pool_api_url`    |
//! | `ODDSYNC_INDEXER_URL`  | `ledger.indexer_url`     |
//!
//! # Example
//!
//! ```no_run
//! use oddsync::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::display::DisplayConfig;
use super::logging::LoggingConfig;
use super::sync::SyncConfig;
use crate::adapter::outbound::ledger::settings::LedgerConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding `ledger.pool_api_url`.
pub const POOL_API_URL_ENV: &str = "ODDSYNC_POOL_API_URL";
/// Environment variable overriding `ledger.indexer_url`.
pub const INDEXER_URL_ENV: &str = "ODDSYNC_INDEXER_URL";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pool read API and prediction indexer endpoints.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Polling interval and update channel sizing.
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Parse configuration from TOML content, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    /// (still subject to environment overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_toml(&content),
            Err(err) if err.kind() == ErrorKind::NotFound => Self::parse_toml(""),
            Err(err) => Err(ConfigError::ReadFile(err).into()),
        }
    }

    /// Replace ledger endpoints with values found through `lookup`.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_empty(POOL_API_URL_ENV) {
            self.ledger.pool_api_url = url;
        }
        if let Some(url) = non_empty(INDEXER_URL_ENV) {
            self.ledger.indexer_url = url;
        }
    }

    /// Initialize the tracing subscriber from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for an empty endpoint and
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        validate_url("pool_api_url", &self.ledger.pool_api_url)?;
        validate_url("indexer_url", &self.ledger.indexer_url)?;

        if self.ledger.http.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_max_attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.ledger.http.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.sync.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.sync.update_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "update_channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.display.unit_symbol.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "unit_symbol",
            }
            .into());
        }

        Ok(())
    }
}

#[allow(clippy::result_large_err)]
fn validate_url(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    let url = Url::parse(value).map_err(|err| ConfigError::InvalidValue {
        field,
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }
        .into());
    }
    Ok(())
}
