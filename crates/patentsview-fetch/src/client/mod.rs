//! PatentsView API client.
//!
//! Provides an async HTTP client with:
//! - Connection pooling via reqwest
//! - One POST per result page
//! - Fixed-delay retry, bounded or unbounded, per page

mod retry;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{Page, Query};

/// PatentsView patent endpoint client.
#[derive(Clone)]
pub struct PatentsViewClient {
    /// HTTP client.
    client: Client,

    /// Patent query endpoint.
    query_url: String,
}

impl PatentsViewClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL is invalid or HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        Ok(Self { client, query_url: config.query_url })
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Fetch one page (1-based) of `query`, retrying per the query's policy.
    ///
    /// # Errors
    ///
    /// Returns error on API failure once retrying is disabled or exhausted.
    #[instrument(skip(self, query), fields(range = %query.range(), per_page = query.per_page()))]
    pub async fn query_page(&self, query: &Query, page: u32) -> ClientResult<Page> {
        let body = query.request_body(page);
        let body = &body;
        retry::with_retry(query.retry(), move || self.post(body)).await
    }

    /// Make a single POST to the query endpoint.
    async fn post(&self, body: &serde_json::Value) -> ClientResult<Page> {
        let response = self.client.post(&self.query_url).json(body).send().await?;

        let response = Self::handle_response(response).await?;
        let bytes = response.bytes().await?;
        let page: Page = serde_json::from_slice(&bytes)?;

        debug!(count = page.count, total = page.total_patent_count, "Received page");
        Ok(page)
    }

    /// Turn non-success statuses into errors.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::status(status.as_u16(), reason, body))
    }
}

impl std::fmt::Debug for PatentsViewClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatentsViewClient").field("query_url", &self.query_url).finish()
    }
}
