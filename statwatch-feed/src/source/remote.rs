//! Remote stats source.
//!
//! Pulls the aggregate system stats record from the backend's
//! `/system-stats` endpoint and classifies every failure into a
//! [`SourceError`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use statwatch_feed::{RemoteSource, SampleSource};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = RemoteSource::builder()
//!         .base_url("http://localhost:8080/api")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let data = source.fetch_sample().await?;
//!     println!("cpu: {:?}", data.value("cpu_percent"));
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use statwatch_types::{SampleData, SystemStats};
use tracing::debug;

use super::SampleSource;
use crate::SourceError;

/// Path of the stats endpoint, relative to the API base URL.
pub const STATS_PATH: &str = "/system-stats";

/// Default API base URL.
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default request timeout.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A source that fetches [`SystemStats`] over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Client,
    url: String,
    description: String,
}

impl RemoteSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> RemoteSourceBuilder {
        RemoteSourceBuilder::default()
    }

    /// Create a source that reuses an existing client.
    ///
    /// Share the client of a logged-in [`Session`](crate::Session) so the
    /// session cookie is sent with every fetch.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        let url = stats_url(base_url);
        let description = format!("remote: {}", url);
        Self {
            client,
            url,
            description,
        }
    }

    /// The full URL of the stats endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SampleSource for RemoteSource {
    async fn fetch_sample(&self) -> Result<SampleData, SourceError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        debug!("GET {} -> {}", self.url, status);
        classify_status(status)?;

        let body = response.bytes().await?;
        decode_stats(&body).map(SampleData::Stats)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`RemoteSource`].
#[derive(Debug, Default)]
pub struct RemoteSourceBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl RemoteSourceBuilder {
    /// Set the API base URL (e.g., "http://localhost:8080/api").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source with its own cookie-enabled client.
    pub fn build(self) -> Result<RemoteSource, reqwest::Error> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .cookie_store(true)
            .build()?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(RemoteSource::with_client(client, &base_url))
    }
}

/// Join the base URL and the stats path without doubling slashes.
fn stats_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), STATS_PATH)
}

/// Map an HTTP status to the feed's error taxonomy.
fn classify_status(status: StatusCode) -> Result<(), SourceError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SourceError::Unauthorized),
        s if s.is_success() => Ok(()),
        s => Err(SourceError::ServerError(format!(
            "stats endpoint returned {}",
            s
        ))),
    }
}

/// Decode a stats body; anything that is not a complete record is a server error.
fn decode_stats(body: &[u8]) -> Result<SystemStats, SourceError> {
    serde_json::from_slice(body)
        .map_err(|e| SourceError::ServerError(format!("invalid stats payload: {}", e)))
}
