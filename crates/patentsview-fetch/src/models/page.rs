//! Response model of the patent query endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One patent as returned by the API.
///
/// Patent-level fields are top-level keys; related entities are arrays of
/// objects under their group key (`assignees`, `inventors`, `IPCs`, ...).
pub type PatentRecord = Map<String, Value>;

/// One page of query results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Records on this page. The API sends `null` when nothing matched.
    #[serde(default)]
    pub patents: Option<Vec<PatentRecord>>,

    /// Records on this page.
    #[serde(default)]
    pub count: u64,

    /// Records matched by the query across all pages.
    pub total_patent_count: u64,
}

impl Page {
    /// Number of pages of `per_page` records needed for the whole result.
    #[must_use]
    pub fn pages_needed(&self, per_page: u32) -> u32 {
        let pages = self.total_patent_count.div_ceil(u64::from(per_page.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Take the records, empty when the API sent `null`.
    #[must_use]
    pub fn into_records(self) -> Vec<PatentRecord> {
        self.patents.unwrap_or_default()
    }
}
