//! Transformation module.
//!
//! - Rules: per-header value rules and their evaluator
//! - Mapping: the header mapping table
//! - Cleaner: raw export to readable layout
//! - Mapper: any table to the import template
//! - Pipeline: decode, transform, encode

pub mod cleaner;
pub mod mapper;
pub mod mapping;
pub mod pipeline;
pub mod rules;

pub use cleaner::clean;
pub use mapper::{map_to_template, map_with_report, MappingReport};
pub use mapping::{HeaderMapping, ResolvedHeader};
pub use pipeline::*;
pub use rules::{rules_description, MappingRule};
