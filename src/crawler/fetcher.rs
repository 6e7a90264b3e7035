//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Redirect handling
//! - Error classification into transient and terminal failures

use crate::config::{Config, UserAgentConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Response};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Content types accepted as documentation pages
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Why a single fetch failed
///
/// Transient failures are retried by the retry policy; terminal failures are
/// recorded against the URL straight away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("server error: HTTP {0}")]
    ServerError(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("client error: HTTP {0}")]
    ClientError(u16),

    #[error("not an HTML page (Content-Type: {0:?})")]
    ContentMismatch(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Returns true if retrying the same request may succeed
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout | Retry |
    /// | Connection refused / reset | Retry |
    /// | HTTP 5xx | Retry |
    /// | Body cut off mid-read | Retry |
    /// | HTTP 4xx | Immediate failure |
    /// | Non-HTML content | Immediate failure |
    /// | Redirect chain > 10, bad URL | Immediate failure |
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout
                | FetchError::Connect(_)
                | FetchError::ServerError(_)
                | FetchError::Body(_)
        )
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else if error.is_builder() {
            FetchError::InvalidUrl(error.to_string())
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

/// Source of page bodies
///
/// The crawler only needs "give me the HTML at this URL"; tests drive it
/// with a scripted implementation instead of the network.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout, covering connect, redirects and body
///
/// # Example
///
/// ```no_run
/// use apidoc_harvester::config::UserAgentConfig;
/// use apidoc_harvester::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "ApiDocHarvester".to_string(),
///     crawler_version: "1.0".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml"),
    );

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the user agent and timeout settings
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        build_http_client(&config.user_agent, config.crawler.request_timeout()).map(Self::new)
    }
}

/// Maps a response to its body or to the failure it represents
///
/// Only `2xx` responses with an HTML content type are accepted.
async fn read_html(response: Response) -> Result<String, FetchError> {
    let status = response.status();
    if status.is_server_error() {
        return Err(FetchError::ServerError(status.as_u16()));
    }
    if !status.is_success() {
        return Err(FetchError::ClientError(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !is_html(&content_type) {
        return Err(FetchError::ContentMismatch(content_type));
    }

    response.text().await.map_err(FetchError::from_reqwest)
}

/// True for `text/html` and `application/xhtml+xml`, ignoring parameters
/// such as `; charset=utf-8`
pub fn is_html(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    HTML_CONTENT_TYPES.contains(&essence.as_str())
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        if response.url() != url {
            tracing::debug!("{} redirected to {}", url, response.url());
        }

        read_html(response).await
    }
}
