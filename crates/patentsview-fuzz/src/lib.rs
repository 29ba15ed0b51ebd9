//! Fuzzing library for patentsview-fetch.
//!
//! This crate provides fuzzing targets for the response parser, the
//! record flattener, and query validation.
//!
//! # Usage
//!
//! ```bash
//! cd crates/patentsview-fuzz
//! cargo +nightly fuzz run fuzz_page_parse -- -max_total_time=60
//! ```

pub use patentsview_fetch::{fields, models, tables};

/// Selection touching the top level, a plain nested group, and the `IPCs` key.
pub const FUZZ_FIELDS: &[&str] =
    &["patent_title", "assignee_id", "inventor_id", "ipc_section", "app_id"];
