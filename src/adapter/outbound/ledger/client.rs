//! Ledger REST API client.
//!
//! Talks to two services:
//! - **Pool read API**: current stake pool per market (`/pools/{id}`) and
//!   the market directory (`/markets`)
//! - **Prediction indexer**: a user's historical stakes
//!   (`/predictions?user=...`)
//!
//! Transient failures (timeouts, refused connections) are retried with a
//! fixed backoff. HTTP status errors are returned at once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::dto::{MarketsResponse, PoolResponse, PredictionsResponse};
use super::settings::LedgerConfig;
use crate::domain::{MarketFilter, MarketId, MarketListing, PoolReading, PredictionRecord, UserId};
use crate::error::{Error, Result};
use crate::port::outbound::ledger::{MarketDirectory, PoolReader, PredictionIndexer};

/// HTTP client for the pool read API and the prediction indexer.
pub struct LedgerClient {
    http: HttpClient,
    pool_api_url: Url,
    indexer_url: Url,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl LedgerClient {
    /// Create a client for the given base URLs with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if either base URL does not parse.
    pub fn new(pool_api_url: &str, indexer_url: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(),
            pool_api_url: Url::parse(pool_api_url)?,
            indexer_url: Url::parse(indexer_url)?,
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::Url`] if either base URL does not parse.
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Ok(Self {
            http,
            pool_api_url: Url::parse(&config.pool_api_url)?,
            indexer_url: Url::parse(&config.indexer_url)?,
            retry_max_attempts: config.http.retry_max_attempts,
            retry_backoff_ms: config.http.retry_backoff_ms,
        })
    }

    /// URL of the pool for `market_id`.
    pub fn pool_url(&self, market_id: &MarketId) -> Result<Url> {
        endpoint(&self.pool_api_url, &["pools", market_id.as_str()])
    }

    /// URL of the market directory, narrowed by `filter`.
    pub fn markets_url(&self, filter: MarketFilter) -> Result<Url> {
        let mut url = endpoint(&self.pool_api_url, &["markets"])?;
        let status = match filter {
            MarketFilter::All => None,
            MarketFilter::Pending => Some("pending"),
            MarketFilter::Locked => Some("locked"),
        };
        if let Some(status) = status {
            url.query_pairs_mut().append_pair("status", status);
        }
        Ok(url)
    }

    /// URL of the indexer query for `user_id`.
    pub fn predictions_url(&self, user_id: &UserId) -> Result<Url> {
        let mut url = endpoint(&self.indexer_url, &["predictions"])?;
        url.query_pairs_mut().append_pair("user", user_id.as_str());
        Ok(url)
    }

    async fn get_with_retry<T>(&self, url: Url) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = self.http.get(url.clone()).send().await;
            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = match response.error_for_status() {
                Ok(response) => response,
                Err(err) => return Err(err.into()),
            };

            let parsed = response.json::<T>().await;
            match parsed {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

#[async_trait]
impl PoolReader for LedgerClient {
    async fn fetch_pool(&self, market_id: &MarketId) -> Result<PoolReading> {
        let url = self.pool_url(market_id)?;
        debug!(url = %url, "Fetching pool");
        let response: PoolResponse = self.get_with_retry(url).await?;
        response.into_reading(market_id)
    }

    fn source_name(&self) -> &'static str {
        "ledger-http"
    }
}

#[async_trait]
impl PredictionIndexer for LedgerClient {
    async fn fetch_predictions(&self, user_id: &UserId) -> Result<Vec<PredictionRecord>> {
        let url = self.predictions_url(user_id)?;
        debug!(url = %url, "Fetching predictions");
        let response: PredictionsResponse = self.get_with_retry(url).await?;
        Ok(response.into_records())
    }
}

#[async_trait]
impl MarketDirectory for LedgerClient {
    async fn list_markets(&self, filter: MarketFilter) -> Result<Vec<MarketListing>> {
        let url = self.markets_url(filter)?;
        debug!(url = %url, "Fetching markets");
        let response: MarketsResponse = self.get_with_retry(url).await?;
        let listings = response
            .into_inner()
            .into_iter()
            .map(|market| market.into_listing())
            .collect::<Result<Vec<_>>>()?;
        debug!(count = listings.len(), ?filter, "Fetched markets");
        Ok(listings)
    }
}

/// Append path segments to `base`, keeping any path it already has.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::Parse(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
