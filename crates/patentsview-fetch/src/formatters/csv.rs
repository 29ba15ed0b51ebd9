//! CSV output.

use serde_json::Value;

use crate::tables::Table;

/// Render a table as CSV with a header row.
#[must_use]
pub fn to_csv(table: &Table) -> String {
    let mut output = String::new();

    let header: Vec<String> = table.columns().iter().map(|c| csv_escape(c)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(csv_cell).collect();
        output.push_str(&cells.join(","));
        output.push('\n');
    }

    output
}

/// Render one JSON value as a CSV cell.
fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => csv_escape(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => csv_quote(&nested.to_string()),
    }
}

/// Escape a string for CSV output.
///
/// Text that a spreadsheet would evaluate as a formula gets a leading quote.
/// Numeric text such as a negative longitude is left alone.
fn csv_escape(s: &str) -> String {
    let guarded = if is_formula_like(s) { format!("'{s}") } else { s.to_string() };

    if guarded.contains(',') || guarded.contains('"') || guarded.contains('\n') || guarded.contains('\r')
    {
        csv_quote(&guarded)
    } else {
        guarded
    }
}

fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn is_formula_like(s: &str) -> bool {
    s.starts_with(['=', '+', '-', '@']) && s.parse::<f64>().is_err()
}
