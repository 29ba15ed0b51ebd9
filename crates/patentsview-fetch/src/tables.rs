//! Reshaping patent records into one table per entity group.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FetchError, FetchResult};
use crate::fields::{FieldSelection, Group, PATENT_NUMBER};
use crate::models::PatentRecord;

/// Output of a fetch: one table per group that had requested fields.
pub type Tables = BTreeMap<Group, Table>;

/// Rows that all share one column list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Empty table with the given columns.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    /// Column names, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows; each has exactly `columns().len()` cells.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Add a row.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the row width does not match the columns.
    pub fn push_row(&mut self, row: Vec<Value>) -> FetchResult<()> {
        if row.len() != self.columns.len() {
            return Err(FetchError::validation(
                "row",
                format!("expected {} cells, got {}", self.columns.len(), row.len()),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Move all rows of `other` to the end of this table.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the column lists differ.
    pub fn append(&mut self, mut other: Self) -> FetchResult<()> {
        if self.columns != other.columns {
            return Err(FetchError::validation(
                "columns",
                format!("cannot append {:?} to {:?}", other.columns, self.columns),
            ));
        }
        self.rows.append(&mut other.rows);
        Ok(())
    }

    /// Rows as column-name → value maps.
    pub fn records(&self) -> impl Iterator<Item = Map<String, Value>> + '_ {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
    }
}

/// Split records into per-group tables.
///
/// The `patents` table gets one row per record. Every other group gets one
/// row per element of the record's nested array for that group, keyed by the
/// parent's `patent_number`; records without elements contribute no rows.
/// Missing values become `null`.
#[must_use]
pub fn flatten(records: &[PatentRecord], selection: &FieldSelection) -> Tables {
    selection
        .groups()
        .into_iter()
        .map(|(group, columns)| {
            let mut table = Table::new(columns.iter().copied());
            for record in records {
                match group.response_key() {
                    None => table.rows.push(patent_row(record, &columns)),
                    Some(key) => table.rows.extend(child_rows(record, key, &columns)),
                }
            }
            (group, table)
        })
        .collect()
}

fn patent_row(record: &PatentRecord, columns: &[&str]) -> Vec<Value> {
    columns.iter().map(|&c| record.get(c).cloned().unwrap_or(Value::Null)).collect()
}

fn child_rows<'a>(
    record: &'a PatentRecord,
    key: &str,
    columns: &'a [&'a str],
) -> impl Iterator<Item = Vec<Value>> + 'a {
    let parent = record.get(PATENT_NUMBER).cloned().unwrap_or(Value::Null);
    let children: &[Value] = match record.get(key) {
        Some(Value::Array(children)) => children,
        _ => &[],
    };

    children.iter().map(move |child| {
        columns
            .iter()
            .map(|&c| {
                if c == PATENT_NUMBER {
                    parent.clone()
                } else {
                    child.get(c).cloned().unwrap_or(Value::Null)
                }
            })
            .collect()
    })
}

/// Append every table of `from` onto the matching table of `into`.
///
/// # Errors
///
/// Returns a validation error if a group's columns differ between the two.
pub fn merge_tables(into: &mut Tables, from: Tables) -> FetchResult<()> {
    for (group, table) in from {
        match into.get_mut(&group) {
            Some(existing) => existing.append(table)?,
            None => {
                into.insert(group, table);
            }
        }
    }
    Ok(())
}

/// Look a table up by its group name (`"patents"`, `"assignees"`, ...).
#[must_use]
pub fn table_by_name<'a>(tables: &'a Tables, name: &str) -> Option<&'a Table> {
    Group::from_name(name).and_then(|group| tables.get(&group))
}
