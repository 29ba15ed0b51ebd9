//! Data models for PatentsView queries and responses.

mod page;
mod query;

pub use page::{Page, PatentRecord};
pub use query::{DateRange, Query, QueryInput, RetryPolicy};
