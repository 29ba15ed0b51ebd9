//! PatentsView Fetch
//!
//! Queries the PatentsView patent endpoint for every patent granted in a date
//! range, follows the result pages, and reshapes the records into one table
//! per entity group (patents, assignees, inventors, ...).
//!
//! # Features
//!
//! - **Paginated**: page 1 reports the total, the rest are fetched in order
//! - **Retrying**: optional fixed-delay retry per page, bounded by default
//! - **Tabular**: nested one-to-many relations become their own tables keyed by `patent_number`
//! - **Exportable**: CSV and JSON-lines writers for the resulting tables
//!
//! # Example
//!
//! ```no_run
//! use patentsview_fetch::{Config, Fetcher, Query, RetryPolicy};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let query = Query::new(["patent_number", "assignee_id"], "2019-01-01", "2019-02-01")?
//!         .with_retry(RetryPolicy::fixed(Duration::from_secs(1), 5))?;
//!
//!     let fetcher = Fetcher::from_config(Config::from_env()?)?;
//!     let tables = fetcher.fetch(&query).await?;
//!
//!     for (group, table) in &tables {
//!         println!("{group}: {} rows", table.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fields;
pub mod formatters;
pub mod models;
pub mod tables;

pub use client::PatentsViewClient;
pub use config::Config;
pub use error::{ClientError, FetchError};
pub use fetcher::{Fetcher, fetch};
pub use fields::{FieldSelection, Group};
pub use models::{DateRange, Query, QueryInput, RetryPolicy};
pub use tables::{Table, Tables};
