//! Header mapping table
//!
//! Declares, for each import-template header, which [`MappingRule`] fills it.
//! Headers without an entry resolve to [`MappingRule::Blank`].

use serde::Serialize;
use std::collections::HashMap;

use super::rules::MappingRule;
use crate::schema::PRICE_FIELD;

static BLANK: MappingRule = MappingRule::Blank;

/// Import-template header to value rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderMapping {
    rules: HashMap<String, MappingRule>,
}

/// A template header together with the rule that fills it
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedHeader<'a> {
    pub header: &'a str,
    pub rule: &'a MappingRule,
}

impl HeaderMapping {
    /// Create an empty mapping (every header blank)
    pub fn new() -> Self {
        Self { rules: HashMap::new() }
    }

    /// Add or replace the rule for `header`
    pub fn with_rule(mut self, header: &str, rule: MappingRule) -> Self {
        self.rules.insert(header.to_string(), rule);
        self
    }

    /// Rule for `header`, [`MappingRule::Blank`] when none is declared
    pub fn rule_for(&self, header: &str) -> &MappingRule {
        self.rules.get(header).unwrap_or(&BLANK)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve every header of a template to its rule, in template order
    pub fn resolve<'a>(&'a self, headers: &'a [String]) -> Vec<ResolvedHeader<'a>> {
        headers
            .iter()
            .map(|h| ResolvedHeader { header: h, rule: self.rule_for(h) })
            .collect()
    }

    /// Mapped headers that the template does not contain, sorted
    pub fn unused_headers(&self, headers: &[String]) -> Vec<String> {
        let mut unused: Vec<String> = self
            .rules
            .keys()
            .filter(|k| !headers.iter().any(|h| h == *k))
            .cloned()
            .collect();
        unused.sort();
        unused
    }

    /// All source fields referenced by the mapping, sorted and deduplicated
    pub fn source_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .rules
            .values()
            .filter_map(|r| r.source())
            .map(str::to_string)
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// The built-in shipment export to import-template mapping
    pub fn shipment_default() -> Self {
        Self::new()
            .with_rule("Order ID", MappingRule::identity("ShipmentNumber"))
            .with_rule("VIN", MappingRule::identity("Vin"))
            .with_rule("Pickup Street", MappingRule::identity("OriginAddress"))
            .with_rule("Pickup City", MappingRule::identity("OriginCity"))
            .with_rule("Pickup State", MappingRule::geo_code("OriginState"))
            .with_rule("Pickup Zip Code", MappingRule::identity("OriginZip"))
            .with_rule("Pickup Contact Phone", MappingRule::identity("OriginContactPhone"))
            .with_rule("Pickup Date", MappingRule::date_format("ScheduledPickupDate"))
            .with_rule("Pickup Date Type", MappingRule::constant("estimated"))
            .with_rule("Delivery Street", MappingRule::identity("DestinationAddress"))
            .with_rule("Delivery City", MappingRule::identity("DestinationCity"))
            .with_rule("Delivery State", MappingRule::geo_code("DestinationState"))
            .with_rule("Delivery Zip Code", MappingRule::identity("DestinationZip"))
            .with_rule("Delivery Contact Phone", MappingRule::identity("DestinationContactPhone"))
            .with_rule("Delivery Date", MappingRule::date_format("ScheduledDeliveryDate"))
            .with_rule("Delivery Date Type", MappingRule::constant("estimated"))
            .with_rule("Carrier Price per Vehicle", MappingRule::identity(PRICE_FIELD))
            .with_rule("Carrier Payment Method", MappingRule::constant("check"))
            .with_rule("Carrier Payment Terms", MappingRule::constant("15_days"))
    }
}

impl Default for HeaderMapping {
    fn default() -> Self {
        Self::shipment_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_header_is_blank() {
        let mapping = HeaderMapping::shipment_default();
        assert_eq!(mapping.rule_for("Lot Number"), &MappingRule::Blank);
        assert_eq!(mapping.rule_for("vin"), &MappingRule::Blank);
    }

    #[test]
    fn test_default_rules() {
        let mapping = HeaderMapping::shipment_default();
        assert_eq!(mapping.rule_for("VIN"), &MappingRule::identity("Vin"));
        assert_eq!(mapping.rule_for("Pickup State"), &MappingRule::geo_code("OriginState"));
        assert_eq!(
            mapping.rule_for("Carrier Payment Method"),
            &MappingRule::constant("check")
        );
    }

    #[test]
    fn test_default_sources_are_registry_fields() {
        let schema = crate::schema::ShipmentSchema::default();
        for field in HeaderMapping::shipment_default().source_fields() {
            assert!(schema.is_retained(&field), "{} is not a retained field", field);
        }
    }

    #[test]
    fn test_rule_count() {
        assert!(HeaderMapping::new().is_empty());

        let mapping = HeaderMapping::shipment_default();
        assert_eq!(mapping.len(), 19);
        assert!(!mapping.with_rule("VIN", MappingRule::Blank).is_empty());
    }

    #[test]
    fn test_unused_headers() {
        let mapping = HeaderMapping::new()
            .with_rule("VIN", MappingRule::identity("Vin"))
            .with_rule("Legacy Column", MappingRule::constant("x"));
        let template = vec!["VIN".to_string(), "Notes".to_string()];

        assert_eq!(mapping.unused_headers(&template), vec!["Legacy Column".to_string()]);

        let resolved = mapping.resolve(&template);
        assert_eq!(resolved[1].header, "Notes");
        assert_eq!(resolved[1].rule, &MappingRule::Blank);
    }
}
