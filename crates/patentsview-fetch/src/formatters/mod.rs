//! Export of fetched tables to files.

mod csv;
mod json;

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use csv::to_csv;
pub use json::to_json_lines;

use crate::tables::{Table, Tables};

/// File format for exported tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl OutputFormat {
    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
        }
    }

    /// Render a table in this format.
    ///
    /// # Errors
    ///
    /// Returns error if a row cannot be serialized.
    pub fn render(self, table: &Table) -> anyhow::Result<String> {
        Ok(match self {
            Self::Csv => to_csv(table),
            Self::Jsonl => to_json_lines(table)?,
        })
    }
}

/// Write every table to `<dir>/<prefix><group>.<ext>`, creating `dir` if needed.
///
/// Returns the written paths in group order.
///
/// # Errors
///
/// Returns error if the directory or a file cannot be written.
pub fn write_tables(
    tables: &Tables,
    dir: &Path,
    prefix: &str,
    format: OutputFormat,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(tables.len());
    for (group, table) in tables {
        let path = dir.join(format!("{prefix}{}.{}", group.name(), format.extension()));
        let contents = format.render(table)?;
        std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;

        info!(table = %group, rows = table.len(), path = %path.display(), "Wrote table");
        written.push(path);
    }

    Ok(written)
}
