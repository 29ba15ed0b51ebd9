//! Configuration for the PatentsView client.

use std::time::Duration;

use anyhow::Context;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Patent search endpoint of the PatentsView API.
    pub const QUERY_URL: &str = "https://api.patentsview.org/patents/query";

    /// Largest `per_page` the API accepts.
    pub const MAX_PER_PAGE: u32 = 10_000;

    /// Results a single query may match before the API stops paging.
    pub const MAX_RESULTS: u64 = 100_000;

    /// Delay between retries when none is given.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

    /// Attempts per page (first try included) when retrying is bounded.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Request timeout. Full 10k-record pages can take a while to serialize server-side.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 2;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Full URL of the patent query endpoint (override for mock servers).
    pub query_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Create the configuration for the public API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            query_url: api::QUERY_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            query_url: format!("{}/patents/query", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Use a different endpoint URL.
    #[must_use]
    pub fn with_query_url(mut self, query_url: impl Into<String>) -> Self {
        self.query_url = query_url.into();
        self
    }

    /// Create configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Reads `PATENTSVIEW_QUERY_URL` and `PATENTSVIEW_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::new();

        if let Ok(query_url) = std::env::var("PATENTSVIEW_QUERY_URL") {
            config.query_url = query_url;
        }

        if let Ok(secs) = std::env::var("PATENTSVIEW_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("PATENTSVIEW_TIMEOUT_SECS is not a number: {secs}"))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns error if the URL does not parse or uses another scheme.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.query_url)
            .with_context(|| format!("invalid query URL: {}", self.query_url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "query URL must use http or https, got {}",
            url.scheme()
        );
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
