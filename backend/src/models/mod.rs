//! Domain models for the Carload conversion pipeline.
//!
//! - [`Table`] - Ordered rows of named fields with a fixed header list
//! - [`Row`] - One record, field name to value
//!
//! Values are JSON scalars: text, number, or empty (`null` or `""`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single record: field name to value.
pub type Row = Map<String, Value>;

// =============================================================================
// Table
// =============================================================================

/// An ordered table of records.
///
/// Every row has exactly the fields listed in `headers`; constructors fill
/// missing fields with empty values and drop fields outside the header list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: dedup_headers(headers),
            rows: Vec::new(),
        }
    }

    /// Build a table from JSON records.
    ///
    /// Non-object records are skipped.
    pub fn from_records(headers: Vec<String>, records: Vec<Value>) -> Self {
        let mut table = Self::new(headers);
        for record in records {
            if let Value::Object(row) = record {
                table.push_row(row);
            }
        }
        table
    }

    /// Append a row, normalizing it to the table's field set.
    pub fn push_row(&mut self, mut row: Row) {
        let normalized: Row = self
            .headers
            .iter()
            .map(|h| (h.clone(), row.remove(h).unwrap_or(Value::Null)))
            .collect();
        self.rows.push(normalized);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the table carries a field.
    pub fn has_field(&self, field: &str) -> bool {
        self.headers.iter().any(|h| h == field)
    }

    /// Value of `field` in row `index`.
    pub fn value(&self, index: usize, field: &str) -> Option<&Value> {
        self.rows.get(index).and_then(|row| row.get(field))
    }

    /// Add a column filled with `fill`. No-op if the field already exists.
    pub fn add_column(&mut self, field: &str, fill: Value) {
        if self.has_field(field) {
            return;
        }
        self.headers.push(field.to_string());
        for row in &mut self.rows {
            row.insert(field.to_string(), fill.clone());
        }
    }

    /// Restrict the table to `columns`, in that order.
    ///
    /// Columns not present in the table are ignored.
    pub fn select(self, columns: &[&str]) -> Self {
        let headers: Vec<String> = columns
            .iter()
            .filter(|c| self.has_field(c))
            .map(|c| c.to_string())
            .collect();
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                headers
                    .iter()
                    .map(|h| (h.clone(), row.remove(h).unwrap_or(Value::Null)))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    /// Reorder rows in place with a stable sort.
    pub fn sort_rows_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Row, &Row) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }

    /// Rows as JSON values (for CLI/debug output).
    pub fn to_records(&self) -> Vec<Value> {
        self.rows.iter().cloned().map(Value::Object).collect()
    }
}

/// Trim header names, name blank ones by position and suffix duplicates
/// (`Vin`, `Vin.1`, ...) so every column keeps its own name.
pub fn unique_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.as_ref().trim();
            let base = if h.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}.{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

/// Keep the first occurrence of each header name.
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    headers
        .into_iter()
        .filter(|h| seen.insert(h.clone()))
        .collect()
}

// =============================================================================
// Cell helpers
// =============================================================================

/// Stringify a cell value. Missing, `null` and non-scalar values are empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
