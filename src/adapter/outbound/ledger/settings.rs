//! Ledger read API configuration.

use serde::Deserialize;

/// Where and how to reach the pool read API and the prediction indexer.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Base URL of the pool read API (pools and market directory).
    #[serde(default = "default_pool_api_url")]
    pub pool_api_url: String,
    /// Base URL of the prediction indexer.
    #[serde(default = "default_indexer_url")]
    pub indexer_url: String,
    /// HTTP client settings shared by both APIs.
    #[serde(flatten)]
    pub http: LedgerHttpConfig,
}

fn default_pool_api_url() -> String {
    "http://localhost:3001/api".into()
}

fn default_indexer_url() -> String {
    "http://localhost:3002".into()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            pool_api_url: default_pool_api_url(),
            indexer_url: default_indexer_url(),
            http: LedgerHttpConfig::default(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerHttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Maximum number of attempts for transient failures.
    #[serde(default = "default_http_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff between retries in milliseconds.
    #[serde(default = "default_http_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_http_retry_max_attempts() -> u32 {
    3
}

const fn default_http_retry_backoff_ms() -> u64 {
    250
}

impl Default for LedgerHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
            retry_max_attempts: default_http_retry_max_attempts(),
            retry_backoff_ms: default_http_retry_backoff_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_settings_default_when_omitted() {
        let config: LedgerConfig = toml::from_str(
            r#"
pool_api_url = "https://pools.example"
indexer_url = "https://indexer.example"
"#,
        )
        .unwrap();

        assert_eq!(config.pool_api_url, "https://pools.example");
        assert_eq!(config.http.timeout_ms, 10_000);
        assert_eq!(config.http.connect_timeout_ms, 5_000);
        assert_eq!(config.http.retry_max_attempts, 3);
        assert_eq!(config.http.retry_backoff_ms, 250);
    }

    #[test]
    fn http_settings_are_flattened() {
        let config: LedgerConfig = toml::from_str("timeout_ms = 50\nretry_max_attempts = 1").unwrap();
        assert_eq!(config.http.timeout_ms, 50);
        assert_eq!(config.http.retry_max_attempts, 1);
        assert_eq!(config.indexer_url, default_indexer_url());
    }
}
