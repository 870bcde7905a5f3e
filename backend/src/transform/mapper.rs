//! Template mapper
//!
//! Builds an import-template table from any shipment table: one output column
//! per template header, in template order, each filled by its mapping rule.

use serde_json::Value;

use super::mapping::HeaderMapping;
use super::rules::MappingRule;
use crate::models::{unique_headers, Row, Table};

/// Per-column outcome of a mapping run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingReport {
    /// Headers filled from a source field
    pub mapped: Vec<String>,
    /// Headers filled with a constant
    pub constant: Vec<String>,
    /// Headers left blank (no rule, or source field absent)
    pub blank: Vec<String>,
}

impl MappingReport {
    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "{} mapped, {} constant, {} blank",
            self.mapped.len(),
            self.constant.len(),
            self.blank.len()
        )
    }
}

/// Map a table onto the template headers.
///
/// The output has one column per header, in order; repeated headers are
/// suffixed as the template loader does. Row count and row order are
/// preserved. A source field absent from the input blanks its column.
pub fn map_to_template(table: &Table, headers: &[String], mapping: &HeaderMapping) -> Table {
    map_with_report(table, headers, mapping).0
}

/// Same as [`map_to_template`], also reporting how each header was filled
pub fn map_with_report(
    table: &Table,
    headers: &[String],
    mapping: &HeaderMapping,
) -> (Table, MappingReport) {
    let mut report = MappingReport::default();
    let mut rows: Vec<Row> = vec![Row::new(); table.len()];
    let output_headers = unique_headers(headers);

    for header in &output_headers {
        let rule = mapping.rule_for(header);
        let column = resolve_column(table, rule);

        match (rule, &column) {
            (MappingRule::Constant { .. }, _) => report.constant.push(header.clone()),
            (_, Some(_)) => report.mapped.push(header.clone()),
            (_, None) => report.blank.push(header.clone()),
        }

        for (idx, row) in rows.iter_mut().enumerate() {
            let value = match &column {
                Some(source) => rule.evaluate(table.value(idx, source)),
                None => rule.evaluate(None),
            };
            row.insert(header.clone(), Value::String(value));
        }
    }

    let mut output = Table::new(output_headers);
    for row in rows {
        output.push_row(row);
    }
    (output, report)
}

/// Source field to read for `rule`, if the rule reads one and the table has it
fn resolve_column<'a>(table: &Table, rule: &'a MappingRule) -> Option<&'a str> {
    rule.source().filter(|f| table.has_field(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|h| h.to_string()).collect()
    }

    fn sample_table() -> Table {
        Table::from_records(
            headers(&["Vin", "OriginState", "OriginContactPhone", "ScheduledPickupDate", "Extra"]),
            vec![
                json!({
                    "Vin": "1HG123",
                    "OriginState": "tx",
                    "OriginContactPhone": "5551234567",
                    "ScheduledPickupDate": "2024-03-15",
                    "Extra": "ignored"
                }),
                json!({
                    "Vin": "2FT456",
                    "OriginState": "Texas",
                    "OriginContactPhone": 5559876543u64,
                    "ScheduledPickupDate": "not-a-date",
                    "Extra": "ignored"
                }),
            ],
        )
    }

    #[test]
    fn test_columns_match_template_exactly() {
        let template = headers(&["Lot Number", "VIN", "Pickup State", "Carrier Payment Method"]);
        let output = map_to_template(&sample_table(), &template, &HeaderMapping::default());

        assert_eq!(output.headers(), template.as_slice());
        assert_eq!(output.len(), 2);
        assert!(output.rows().iter().all(|r| r.len() == template.len()));
    }

    #[test]
    fn test_rule_kinds() {
        let template = headers(&[
            "VIN",
            "Pickup State",
            "Pickup Contact Phone",
            "Pickup Date",
            "Carrier Payment Method",
        ]);
        let output = map_to_template(&sample_table(), &template, &HeaderMapping::default());

        assert_eq!(output.value(0, "VIN"), Some(&json!("1HG123")));
        assert_eq!(output.value(0, "Pickup State"), Some(&json!("TX")));
        assert_eq!(output.value(1, "Pickup State"), Some(&json!("TE")));
        assert_eq!(output.value(0, "Pickup Contact Phone"), Some(&json!("5551234567")));
        assert_eq!(output.value(1, "Pickup Contact Phone"), Some(&json!("5559876543")));
        assert_eq!(output.value(0, "Pickup Date"), Some(&json!("03/15/2024")));
        assert_eq!(output.value(1, "Pickup Date"), Some(&json!("")));
        assert_eq!(output.value(1, "Carrier Payment Method"), Some(&json!("check")));
    }

    #[test]
    fn test_missing_source_and_unmapped_are_blank() {
        let template = headers(&["Delivery City", "Lot Number"]);
        let (output, report) =
            map_with_report(&sample_table(), &template, &HeaderMapping::default());

        for row in output.rows() {
            assert_eq!(row["Delivery City"], json!(""));
            assert_eq!(row["Lot Number"], json!(""));
        }
        assert_eq!(report.blank, template);
        assert!(report.mapped.is_empty());
    }

    #[test]
    fn test_constant_on_empty_table() {
        let empty = Table::new(headers(&["Vin"]));
        let template = headers(&["Carrier Payment Method", "VIN"]);
        let output = map_to_template(&empty, &template, &HeaderMapping::default());

        assert!(output.is_empty());
        assert_eq!(output.headers(), template.as_slice());
    }

    #[test]
    fn test_row_order_preserved() {
        let table = Table::from_records(
            headers(&["Vin"]),
            vec![json!({"Vin": "Z"}), json!({"Vin": "A"}), json!({"Vin": "M"})],
        );
        let output = map_to_template(&table, &headers(&["VIN"]), &HeaderMapping::default());
        let vins: Vec<&Value> = output.rows().iter().map(|r| &r["VIN"]).collect();

        assert_eq!(vins, vec![&json!("Z"), &json!("A"), &json!("M")]);
    }

    #[test]
    fn test_one_column_per_template_header() {
        let template = headers(&["VIN", "Notes", "Notes"]);
        let output = map_to_template(&sample_table(), &template, &HeaderMapping::default());

        assert_eq!(output.headers().len(), template.len());
        assert_eq!(output.headers(), &["VIN", "Notes", "Notes.1"]);
        assert_eq!(output.value(0, "VIN"), Some(&json!("1HG123")));
        assert_eq!(output.value(0, "Notes.1"), Some(&json!("")));
    }

    #[test]
    fn test_report_summary() {
        let template = headers(&["VIN", "Carrier Payment Method", "Lot Number"]);
        let (_, report) = map_with_report(&sample_table(), &template, &HeaderMapping::default());
        assert_eq!(report.summary(), "1 mapped, 1 constant, 1 blank");
    }
}
