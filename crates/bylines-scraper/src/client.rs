//! HTTP client shared by every fetch in the pipeline.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Retry ceiling for rate-limited HTML fetches.
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Base delay for exponential backoff: `backoff_base_ms * 2^attempt`.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 100;

/// Fetcher for search pages, profile pages, and images.
///
/// Wraps a single `reqwest::Client`; cloning is cheap and every clone shares
/// the same connection pool, so one instance is built at startup and handed
/// to every worker.
///
/// HTML fetches are retried on HTTP 429 with exponential backoff up to
/// `max_retries` additional attempts. JSON and byte fetches are issued once.
#[derive(Debug, Clone)]
pub struct BylineClient {
    pub(crate) client: Client,
    /// Maximum number of retry attempts after the first rate-limited response.
    pub(crate) max_retries: u32,
    pub(crate) backoff_base_ms: u64,
}

impl BylineClient {
    /// Creates a `BylineClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches an HTML page and returns its body text.
    ///
    /// The body is returned unparsed; callers hand it to the extractors in
    /// [`crate::extract`], which parse and drop the DOM synchronously.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (not retried).
    /// - [`ScraperError::Http`]: network or TLS failure (not retried).
    pub async fn fetch_html(&self, url: &Url) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url.clone())
                .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
                .send()
                .await?;
            check_status(response.status(), url)?;
            Ok(response.text().await?)
        })
        .await
    }

    /// Fetches a JSON document and decodes it into `T`.
    ///
    /// Issued once: a 429 here is terminal, unlike [`Self::fetch_html`].
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] / [`ScraperError::UnexpectedStatus`]: non-2xx.
    /// - [`ScraperError::Http`]: network or TLS failure.
    /// - [`ScraperError::Deserialize`]: body is not valid JSON for `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ScraperError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        check_status(response.status(), url)?;

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| ScraperError::Deserialize {
            context: redact_api_key(url),
            source: e,
        })
    }

    /// Fetches a resource as raw bytes, returning the declared `Content-Type`
    /// alongside the body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] / [`ScraperError::UnexpectedStatus`]: non-2xx.
    /// - [`ScraperError::Http`]: network or TLS failure.
    pub async fn fetch_bytes(&self, url: &Url) -> Result<(Vec<u8>, Option<String>), ScraperError> {
        let response = self.client.get(url.clone()).send().await?;
        check_status(response.status(), url)?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;
        Ok((body.to_vec(), content_type))
    }
}

/// Maps a response status onto the error taxonomy.
fn check_status(status: StatusCode, url: &Url) -> Result<(), ScraperError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ScraperError::RateLimited {
            url: redact_api_key(url),
            attempts: 1,
        });
    }
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: redact_api_key(url),
        });
    }
    Ok(())
}

/// Renders `url` for logs and errors with any `api-key` value masked.
pub(crate) fn redact_api_key(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api-key") {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api-key" {
                "[redacted]".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
