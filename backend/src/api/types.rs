//! REST API response types.

use serde::Serialize;

use crate::transform::mapping::ResolvedHeader;
use crate::transform::pipeline::Converter;

/// Health check document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Number of import template headers loaded
    pub template_headers: usize,
}

impl HealthResponse {
    pub fn ok(converter: &Converter) -> Self {
        Self {
            status: "ok",
            service: "carload",
            version: env!("CARGO_PKG_VERSION"),
            template_headers: converter.template().len(),
        }
    }
}

/// Import template listing: every header with the rule that fills it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse<'a> {
    /// Where the headers were loaded from
    pub origin: &'a str,
    pub headers: Vec<ResolvedHeader<'a>>,
    /// Mapped headers the template lacks
    pub unused_rules: Vec<String>,
}

impl<'a> TemplateResponse<'a> {
    pub fn from_converter(converter: &'a Converter) -> Self {
        let template = converter.template();
        Self {
            origin: template.origin(),
            headers: converter.mapping().resolve(template.headers()),
            unused_rules: converter.coverage_gaps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_response_shape() {
        let converter = Converter::with_defaults().unwrap();
        let value = serde_json::to_value(TemplateResponse::from_converter(&converter)).unwrap();

        assert_eq!(value["origin"], "bundled");
        assert_eq!(value["headers"][0]["header"], "Order ID");
        assert_eq!(value["headers"][0]["rule"]["type"], "identity");
        assert_eq!(value["headers"][0]["rule"]["source"], "ShipmentNumber");
        assert!(value["unusedRules"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_health_counts_headers() {
        let converter = Converter::with_defaults().unwrap();
        let health = HealthResponse::ok(&converter);
        assert_eq!(health.status, "ok");
        assert_eq!(health.template_headers, converter.template().len());
    }
}
