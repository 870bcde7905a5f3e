//! Row cleaner
//!
//! Turns a raw shipment export into the readable layout: unknown columns are
//! dropped, known columns are put in display order and rows are sorted by
//! route.

use serde_json::Value;
use std::cmp::Ordering;

use crate::models::{Row, Table};
use crate::schema::{ShipmentSchema, PRICE_FIELD};

/// Clean a raw table against the schema registry.
///
/// The row count is preserved. Columns outside the registry are dropped.
/// Missing optional columns are skipped, never an error.
pub fn clean(mut table: Table, schema: &ShipmentSchema) -> Table {
    // 1. Price is always present in the readable layout
    if !table.has_field(PRICE_FIELD) {
        table.add_column(PRICE_FIELD, Value::String(String::new()));
    }

    // 2-3. Retained fields in display order
    let order: Vec<&str> = schema
        .display_order()
        .filter(|f| table.has_field(f))
        .collect();

    // 4. Effective sort keys
    let sort_keys: Vec<String> = schema
        .sort_keys()
        .iter()
        .filter(|k| table.has_field(k))
        .cloned()
        .collect();

    let mut cleaned = table.select(&order);

    if !sort_keys.is_empty() {
        cleaned.sort_rows_by(|a, b| compare_rows(a, b, &sort_keys));
    }

    cleaned
}

/// Lexicographic comparison over successive keys
fn compare_rows(a: &Row, b: &Row, keys: &[String]) -> Ordering {
    keys.iter()
        .map(|k| compare_values(a.get(k), b.get(k)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Ascending order for a single cell.
///
/// Numbers compare numerically and sort before text. Text compares
/// lexically. Missing values (`null`) sort last.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (sort_class(a), sort_class(b)) {
        (SortClass::Number(x), SortClass::Number(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (SortClass::Text(x), SortClass::Text(y)) => x.cmp(&y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

enum SortClass {
    Number(f64),
    Text(String),
    Missing,
}

impl SortClass {
    fn rank(&self) -> u8 {
        match self {
            SortClass::Number(_) => 0,
            SortClass::Text(_) => 1,
            SortClass::Missing => 2,
        }
    }
}

fn sort_class(value: Option<&Value>) -> SortClass {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(SortClass::Number).unwrap_or(SortClass::Missing),
        Some(Value::String(s)) => SortClass::Text(s.clone()),
        Some(Value::Bool(b)) => SortClass::Text(b.to_string()),
        _ => SortClass::Missing,
    }
}
