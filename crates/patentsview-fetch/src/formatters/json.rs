//! JSON-lines output.

use crate::error::FetchResult;
use crate::tables::Table;

/// Render a table as one JSON object per line.
///
/// # Errors
///
/// Returns a serialization error if a row cannot be encoded.
pub fn to_json_lines(table: &Table) -> FetchResult<String> {
    let mut output = String::new();
    for record in table.records() {
        output.push_str(&serde_json::to_string(&record)?);
        output.push('\n');
    }
    Ok(output)
}
