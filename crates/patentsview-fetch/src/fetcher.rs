//! Paginated retrieval of a whole query.
//!
//! Pages are fetched one after another. Page 1 reports the total number of
//! matching patents, which fixes how many further pages are requested. Records
//! accumulate in memory and are reshaped into tables once the last page is in.
//! A failure that is not retried aborts the fetch and drops what was collected.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::client::PatentsViewClient;
use crate::config::{Config, api};
use crate::error::{FetchError, FetchResult};
use crate::models::{PatentRecord, Query, RetryPolicy};
use crate::tables::{Tables, flatten, merge_tables};

/// Runs queries against the patent endpoint.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: PatentsViewClient,
}

impl Fetcher {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(client: PatentsViewClient) -> Self {
        Self { client }
    }

    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Setup`] if the client cannot be built.
    pub fn from_config(config: Config) -> FetchResult<Self> {
        PatentsViewClient::new(config).map(Self::new).map_err(FetchError::Setup)
    }

    /// Underlying client.
    #[must_use]
    pub const fn client(&self) -> &PatentsViewClient {
        &self.client
    }

    /// Fetch every page of `query` and split the records into tables.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the range matches more patents than the
    /// API will page through, or a request error if a page cannot be fetched.
    #[instrument(skip_all, fields(range = %query.range()))]
    pub async fn fetch(&self, query: &Query) -> FetchResult<Tables> {
        let records = self.fetch_records(query).await?;
        let tables = flatten(&records, query.fields());

        info!(
            patents = records.len(),
            tables = tables.len(),
            "Finished query"
        );
        Ok(tables)
    }

    /// Fetch every page of `query` and return the raw records.
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::fetch`].
    pub async fn fetch_records(&self, query: &Query) -> FetchResult<Vec<PatentRecord>> {
        info!(range = %query.range(), fields = query.fields().as_slice().len(), "Querying");

        let first = self.client.query_page(query, 1).await?;
        let total = first.total_patent_count;

        if total >= api::MAX_RESULTS {
            return Err(FetchError::validation(
                "date_range",
                format!(
                    "{} matches {total} patents, must be less than {}; narrow the range or fetch in windows",
                    query.range(),
                    api::MAX_RESULTS
                ),
            ));
        }

        let pages = first.pages_needed(query.per_page());
        debug!(total, pages, "Counted results");

        let mut records = Vec::with_capacity(total as usize);
        records.extend(first.into_records());

        for page in 2..=pages {
            debug!(page, pages, "Fetching page");
            let next = self.client.query_page(query, page).await?;
            records.extend(next.into_records());
        }

        if records.len() as u64 != total {
            warn!(
                expected = total,
                received = records.len(),
                "Record count differs from the total reported by the API"
            );
        }

        Ok(records)
    }

    /// Fetch from plain arguments instead of a prepared [`Query`].
    ///
    /// With `force_retry`, a failed page is retried after `retry_delay`, up to
    /// the default number of attempts. Without it the first failure aborts.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, otherwise the same
    /// errors as [`Fetcher::fetch`].
    pub async fn fetch_plain<I, S>(
        &self,
        fields: I,
        start_date: &str,
        end_date: &str,
        per_page: u32,
        force_retry: bool,
        retry_delay: Duration,
    ) -> FetchResult<Tables>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let retry = if force_retry {
            RetryPolicy::fixed(retry_delay, api::DEFAULT_MAX_ATTEMPTS)
        } else {
            RetryPolicy::disabled()
        };

        let query = Query::new(fields, start_date, end_date)?
            .with_per_page(per_page)?
            .with_retry(retry)?;

        self.fetch(&query).await
    }

    /// Fetch `query` in consecutive windows of `months` months and merge the tables.
    ///
    /// Each window is a separate query, so each stays under the per-query
    /// result cap on its own.
    ///
    /// # Errors
    ///
    /// Returns a validation error for `months == 0`, otherwise the first
    /// window's error.
    pub async fn fetch_windowed(&self, query: &Query, months: u32) -> FetchResult<Tables> {
        let windows = query.range().split_by_months(months)?;
        info!(range = %query.range(), windows = windows.len(), "Fetching in windows");

        let mut tables = Tables::new();
        for window in windows {
            let part = self.fetch(&query.with_range(window)).await?;
            merge_tables(&mut tables, part)?;
        }
        Ok(tables)
    }

    /// Run [`Fetcher::fetch`] to completion on a private current-thread runtime.
    ///
    /// Must not be called from inside an async context.
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::fetch`], or [`FetchError::Runtime`] if the runtime
    /// cannot be started.
    pub fn fetch_blocking(&self, query: &Query) -> FetchResult<Tables> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(self.fetch(query))
    }
}

/// Fetch all patents granted in `[start_date, end_date)` with the given fields.
///
/// The endpoint comes from [`Config::from_env`], so `PATENTSVIEW_QUERY_URL`
/// (or a `.env` file) redirects it. See [`Fetcher::fetch_plain`].
///
/// # Errors
///
/// Returns a setup error if the environment holds an invalid configuration,
/// otherwise the same errors as [`Fetcher::fetch_plain`].
pub async fn fetch<I, S>(
    fields: I,
    start_date: &str,
    end_date: &str,
    per_page: u32,
    force_retry: bool,
    retry_delay: Duration,
) -> FetchResult<Tables>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let config = Config::from_env().map_err(FetchError::Setup)?;

    Fetcher::from_config(config)?
        .fetch_plain(fields, start_date, end_date, per_page, force_retry, retry_delay)
        .await
}
