//! Shipment schema registry.
//!
//! Static declarations of the source fields the row cleaner keeps, the order
//! they are displayed in, and the keys rows are sorted by.

use serde::Serialize;

// =============================================================================
// Field declarations
// =============================================================================

/// Synthetic price column, added empty when the export has none.
pub const PRICE_FIELD: &str = "Price";

/// Source fields eligible for the readable output.
pub const RECOGNIZED_FIELDS: &[&str] = &[
    "ShipmentNumber",
    "Vin",
    "OriginState",
    "OriginCity",
    "OriginAddress",
    "OriginZip",
    "OriginContactPhone",
    "DestinationState",
    "DestinationCity",
    "DestinationAddress",
    "DestinationZip",
    "DestinationContactPhone",
];

/// Fields shown first, in this order.
pub const PRIORITY_FIELDS: &[&str] = &[
    "Vin",
    "OriginState",
    "OriginCity",
    "DestinationState",
    "DestinationCity",
    PRICE_FIELD,
];

/// Scheduling fields appended after everything else.
pub const EXTRA_FIELDS: &[&str] = &["ScheduledPickupDate", "ScheduledDeliveryDate"];

/// Multi-key ascending sort order.
pub const SORT_KEYS: &[&str] = &[
    "OriginState",
    "OriginCity",
    "DestinationState",
    "DestinationCity",
    "Vin",
];

// =============================================================================
// Registry
// =============================================================================

/// The field layout used by the row cleaner.
///
/// Built once and shared read-only. [`ShipmentSchema::default`] is the
/// shipment export layout declared above.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentSchema {
    recognized: Vec<String>,
    priority: Vec<String>,
    remainder: Vec<String>,
    extra: Vec<String>,
    sort_keys: Vec<String>,
}

impl ShipmentSchema {
    /// Build a registry. The remainder is derived from `recognized` minus
    /// `priority`, in `recognized` order.
    pub fn new(recognized: &[&str], priority: &[&str], extra: &[&str], sort_keys: &[&str]) -> Self {
        let remainder = recognized
            .iter()
            .filter(|f| !priority.contains(f))
            .map(|f| f.to_string())
            .collect();

        Self {
            recognized: to_owned(recognized),
            priority: to_owned(priority),
            remainder,
            extra: to_owned(extra),
            sort_keys: to_owned(sort_keys),
        }
    }

    pub fn remainder(&self) -> &[String] {
        &self.remainder
    }

    pub fn sort_keys(&self) -> &[String] {
        &self.sort_keys
    }

    /// Whether the cleaner keeps `field`.
    pub fn is_retained(&self, field: &str) -> bool {
        field == PRICE_FIELD
            || self.recognized.iter().any(|f| f == field)
            || self.extra.iter().any(|f| f == field)
    }

    /// Full display order: priority, then remainder, then extra fields.
    pub fn display_order(&self) -> impl Iterator<Item = &str> {
        self.priority
            .iter()
            .chain(self.remainder.iter())
            .chain(self.extra.iter())
            .map(String::as_str)
    }
}

impl Default for ShipmentSchema {
    fn default() -> Self {
        Self::new(RECOGNIZED_FIELDS, PRIORITY_FIELDS, EXTRA_FIELDS, SORT_KEYS)
    }
}

fn to_owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_excludes_priority() {
        let schema = ShipmentSchema::default();
        assert_eq!(
            schema.remainder(),
            &[
                "ShipmentNumber",
                "OriginAddress",
                "OriginZip",
                "OriginContactPhone",
                "DestinationAddress",
                "DestinationZip",
                "DestinationContactPhone",
            ]
        );
    }

    #[test]
    fn test_display_order_has_no_duplicates() {
        let schema = ShipmentSchema::default();
        let order: Vec<&str> = schema.display_order().collect();
        let mut deduped = order.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(order.len(), deduped.len());
        assert_eq!(order[0], "Vin");
        assert_eq!(order[5], PRICE_FIELD);
        assert_eq!(order.last(), Some(&"ScheduledDeliveryDate"));
    }

    #[test]
    fn test_is_retained() {
        let schema = ShipmentSchema::default();
        assert!(schema.is_retained("Vin"));
        assert!(schema.is_retained(PRICE_FIELD));
        assert!(schema.is_retained("ScheduledPickupDate"));
        assert!(!schema.is_retained("VIN"));
        assert!(!schema.is_retained("InternalNotes"));
    }
}
