//! Value rules for template mapping
//!
//! Each target header resolves to one [`MappingRule`]. Rules are total: any
//! input value, including a missing one, produces a string.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::cell_text;

/// How a target header gets its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MappingRule {
    /// Copy the source value as text
    Identity { source: String },

    /// Uppercase and keep the first two characters
    GeoCode { source: String },

    /// Reformat a date as MM/DD/YYYY
    DateFormat { source: String },

    /// Fixed literal for every row
    Constant { value: String },

    /// Empty for every row
    Blank,
}

/// Output format of [`MappingRule::DateFormat`]
pub const OUTPUT_DATE_FORMAT: &str = "%m/%d/%Y";

// `%Y` reads "24" as year 24 and `%y` rejects "2024", so two-digit years go
// first. Month-first formats precede year-first ones for the same reason.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

impl MappingRule {
    pub fn identity(source: &str) -> Self {
        MappingRule::Identity { source: source.to_string() }
    }

    pub fn geo_code(source: &str) -> Self {
        MappingRule::GeoCode { source: source.to_string() }
    }

    pub fn date_format(source: &str) -> Self {
        MappingRule::DateFormat { source: source.to_string() }
    }

    pub fn constant(value: &str) -> Self {
        MappingRule::Constant { value: value.to_string() }
    }

    /// Source field this rule reads, if any
    pub fn source(&self) -> Option<&str> {
        match self {
            MappingRule::Identity { source }
            | MappingRule::GeoCode { source }
            | MappingRule::DateFormat { source } => Some(source),
            MappingRule::Constant { .. } | MappingRule::Blank => None,
        }
    }

    /// Short name of the rule kind
    pub fn kind(&self) -> &'static str {
        match self {
            MappingRule::Identity { .. } => "identity",
            MappingRule::GeoCode { .. } => "geo_code",
            MappingRule::DateFormat { .. } => "date_format",
            MappingRule::Constant { .. } => "constant",
            MappingRule::Blank => "blank",
        }
    }

    /// Evaluate this rule for one row's source value
    pub fn evaluate(&self, value: Option<&Value>) -> String {
        match self {
            MappingRule::Identity { .. } => identity(value),
            MappingRule::GeoCode { .. } => geo_code(value),
            MappingRule::DateFormat { .. } => format_date(value),
            MappingRule::Constant { value } => value.clone(),
            MappingRule::Blank => String::new(),
        }
    }
}

impl std::fmt::Display for MappingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingRule::Identity { source }
            | MappingRule::GeoCode { source }
            | MappingRule::DateFormat { source } => write!(f, "{}({})", self.kind(), source),
            MappingRule::Constant { value } => write!(f, "{}({:?})", self.kind(), value),
            MappingRule::Blank => write!(f, "{}", self.kind()),
        }
    }
}

/// Stringify the value; missing becomes empty.
pub fn identity(value: Option<&Value>) -> String {
    cell_text(value)
}

/// Uppercase, then keep the first two characters.
///
/// Assumes the source already holds an abbreviation: "Texas" becomes "TE".
pub fn geo_code(value: Option<&Value>) -> String {
    cell_text(value).to_uppercase().chars().take(2).collect()
}

/// Reformat a permissively parsed date as MM/DD/YYYY, or empty on failure.
pub fn format_date(value: Option<&Value>) -> String {
    parse_date(&cell_text(value))
        .map(|d| d.format(OUTPUT_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse a calendar date from common export formats. Time is discarded.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}

/// Get a description of all rule kinds for CLI output
pub fn rules_description() -> String {
    r#"Available mapping rules:

| Rule | Description | Parameters |
|------|-------------|------------|
| identity | Copy the source value as text | source: field name |
| geo_code | Uppercase, keep first two characters | source: field name |
| date_format | Reformat date as MM/DD/YYYY (empty if unparsable) | source: field name |
| constant | Same literal on every row | value: literal |
| blank | Empty on every row (headers with no rule) | - |

A rule whose source field is missing from the input yields an empty column."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity() {
        assert_eq!(identity(Some(&json!("5551234567"))), "5551234567");
        assert_eq!(identity(Some(&json!(78701))), "78701");
        assert_eq!(identity(Some(&Value::Null)), "");
        assert_eq!(identity(None), "");
    }

    #[test]
    fn test_geo_code() {
        assert_eq!(geo_code(Some(&json!("tx"))), "TX");
        assert_eq!(geo_code(Some(&json!("ca "))), "CA");
        assert_eq!(geo_code(Some(&json!("n"))), "N");
        assert_eq!(geo_code(None), "");
    }

    #[test]
    fn test_geo_code_truncates_full_names() {
        // Full names are not looked up, only truncated.
        assert_eq!(geo_code(Some(&json!("Texas"))), "TE");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some(&json!("2024-03-15"))), "03/15/2024");
        assert_eq!(format_date(Some(&json!("2024-03-15 08:30:00"))), "03/15/2024");
        assert_eq!(format_date(Some(&json!("2024-03-15T08:30:00Z"))), "03/15/2024");
        assert_eq!(format_date(Some(&json!("3/5/2024"))), "03/05/2024");
        assert_eq!(format_date(Some(&json!("03/15/24"))), "03/15/2024");
        assert_eq!(format_date(Some(&json!("12/05/24"))), "12/05/2024");
        assert_eq!(format_date(Some(&json!("2024/03/15"))), "03/15/2024");
        assert_eq!(format_date(Some(&json!("March 15, 2024"))), "03/15/2024");
        assert_eq!(format_date(Some(&json!(20240315))), "03/15/2024");
    }

    #[test]
    fn test_format_date_unparsable_is_blank() {
        assert_eq!(format_date(Some(&json!("not-a-date"))), "");
        assert_eq!(format_date(Some(&json!("2024-13-45"))), "");
        assert_eq!(format_date(Some(&json!(""))), "");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_constant_ignores_input() {
        let rule = MappingRule::constant("check");
        assert_eq!(rule.evaluate(Some(&json!("cash"))), "check");
        assert_eq!(rule.evaluate(None), "check");
        assert_eq!(rule.source(), None);
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(MappingRule::geo_code("OriginState").to_string(), "geo_code(OriginState)");
        assert_eq!(MappingRule::constant("15_days").to_string(), "constant(\"15_days\")");
        assert_eq!(MappingRule::Blank.to_string(), "blank");
    }

    #[test]
    fn test_rule_serde_shape() {
        let rule = MappingRule::geo_code("OriginState");
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value, json!({"type": "geo_code", "source": "OriginState"}));

        let parsed: MappingRule = serde_json::from_value(json!({"type": "blank"})).unwrap();
        assert_eq!(parsed, MappingRule::Blank);
    }
}
