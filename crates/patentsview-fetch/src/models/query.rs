//! Query input, validation, and request bodies.

use std::time::Duration;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::api;
use crate::error::{ClientError, FetchError, FetchResult};
use crate::fields::FieldSelection;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw query parameters, as given on the command line or in a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueryInput {
    /// PatentsView field names to download.
    pub fields: Vec<String>,

    /// First grant date, inclusive (`YYYY-MM-DD`).
    pub start_date: String,

    /// Last grant date, exclusive (`YYYY-MM-DD`).
    pub end_date: String,

    /// Results per page (max 10000).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Retry automatically when a request fails.
    #[serde(default)]
    pub force_retry: bool,

    /// Seconds to wait before retrying.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Attempts per page, first try included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Ignore `max_attempts` and retry until the page succeeds.
    #[serde(default)]
    pub unbounded_retry: bool,
}

impl Default for QueryInput {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            start_date: String::new(),
            end_date: String::new(),
            per_page: default_per_page(),
            force_retry: false,
            retry_delay_secs: default_retry_delay_secs(),
            max_attempts: default_max_attempts(),
            unbounded_retry: false,
        }
    }
}

fn default_per_page() -> u32 {
    api::MAX_PER_PAGE
}

fn default_retry_delay_secs() -> u64 {
    api::DEFAULT_RETRY_DELAY.as_secs()
}

fn default_max_attempts() -> u32 {
    api::DEFAULT_MAX_ATTEMPTS
}

/// Grant-date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, requiring `start < end`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty or inverted ranges.
    pub fn new(start: NaiveDate, end: NaiveDate) -> FetchResult<Self> {
        if start >= end {
            return Err(FetchError::validation(
                "end_date",
                format!("end date {end} must be after start date {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed dates or an empty range.
    pub fn parse(start: &str, end: &str) -> FetchResult<Self> {
        Self::new(parse_date("start_date", start)?, parse_date("end_date", end)?)
    }

    /// First day in the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day after the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Cut the range into consecutive windows of `months` calendar months.
    ///
    /// The last window is clipped to the range end.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `months` is zero.
    pub fn split_by_months(&self, months: u32) -> FetchResult<Vec<Self>> {
        if months == 0 {
            return Err(FetchError::validation("window_months", "must be at least 1"));
        }

        let mut windows = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            let next = cursor
                .checked_add_months(Months::new(months))
                .map_or(self.end, |next| next.min(self.end));
            windows.push(Self { start: cursor, end: next });
            cursor = next;
        }
        Ok(windows)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn parse_date(field: &str, value: &str) -> FetchResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        FetchError::validation(field, format!("'{value}' is not a YYYY-MM-DD date: {e}"))
    })
}

/// When and how often a failed page request is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry at all. When false the first failure is final.
    pub force_retry: bool,

    /// Sleep between attempts.
    pub delay: Duration,

    /// Attempts per page including the first; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Fail on the first error.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            force_retry: false,
            delay: api::DEFAULT_RETRY_DELAY,
            max_attempts: Some(api::DEFAULT_MAX_ATTEMPTS),
        }
    }

    /// Retry after a fixed delay, at most `max_attempts` tries per page.
    #[must_use]
    pub const fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self { force_retry: true, delay, max_attempts: Some(max_attempts) }
    }

    /// Retry after a fixed delay until the page succeeds.
    #[must_use]
    pub const fn unbounded(delay: Duration) -> Self {
        Self { force_retry: true, delay, max_attempts: None }
    }

    /// Whether to try again after `attempts` tries ended in `error`.
    #[must_use]
    pub fn should_retry(&self, error: &ClientError, attempts: u32) -> bool {
        self.force_retry
            && error.is_retryable()
            && self.max_attempts.is_none_or(|max| attempts < max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// A validated query over one date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    fields: FieldSelection,
    range: DateRange,
    per_page: u32,
    retry: RetryPolicy,
}

impl Query {
    /// Validate fields and dates, using the largest page size and no retry.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown fields or a malformed range.
    pub fn new<I, S>(fields: I, start_date: &str, end_date: &str) -> FetchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            fields: FieldSelection::new(fields)?,
            range: DateRange::parse(start_date, end_date)?,
            per_page: api::MAX_PER_PAGE,
            retry: RetryPolicy::disabled(),
        })
    }

    /// Set the page size.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless `1 <= per_page <= 10000`.
    pub fn with_per_page(mut self, per_page: u32) -> FetchResult<Self> {
        if per_page == 0 || per_page > api::MAX_PER_PAGE {
            return Err(FetchError::validation(
                "per_page",
                format!("must be between 1 and {}, got {per_page}", api::MAX_PER_PAGE),
            ));
        }
        self.per_page = per_page;
        Ok(self)
    }

    /// Set the retry policy.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a bounded policy allows zero attempts.
    pub fn with_retry(mut self, retry: RetryPolicy) -> FetchResult<Self> {
        if retry.max_attempts == Some(0) {
            return Err(FetchError::validation("max_attempts", "must be at least 1"));
        }
        self.retry = retry;
        Ok(self)
    }

    /// Same query over another range.
    #[must_use]
    pub fn with_range(&self, range: DateRange) -> Self {
        Self { range, ..self.clone() }
    }

    /// Requested fields.
    #[must_use]
    pub const fn fields(&self) -> &FieldSelection {
        &self.fields
    }

    /// Grant-date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Results per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Retry policy.
    #[must_use]
    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// JSON body of the POST for one page (1-based).
    #[must_use]
    pub fn request_body(&self, page: u32) -> serde_json::Value {
        json!({
            "q": {
                "_and": [
                    {"_gte": {"patent_date": self.range.start.format(DATE_FORMAT).to_string()}},
                    {"_lt": {"patent_date": self.range.end.format(DATE_FORMAT).to_string()}},
                ]
            },
            "f": self.fields.as_slice(),
            "o": {"page": page, "per_page": self.per_page},
            "s": [{"patent_number": "asc"}],
        })
    }
}

impl TryFrom<QueryInput> for Query {
    type Error = FetchError;

    fn try_from(input: QueryInput) -> FetchResult<Self> {
        let delay = Duration::from_secs(input.retry_delay_secs);
        let retry = match (input.force_retry, input.unbounded_retry) {
            (false, _) => RetryPolicy::disabled(),
            (true, true) => RetryPolicy::unbounded(delay),
            (true, false) => RetryPolicy::fixed(delay, input.max_attempts),
        };

        Self::new(&input.fields, &input.start_date, &input.end_date)?
            .with_per_page(input.per_page)?
            .with_retry(retry)
    }
}
