//! # Carload - shipment spreadsheet conversion
//!
//! Carload converts shipment exports into two layouts: a cleaned "readable"
//! sheet for human review, and a CSV matching a downstream import template.
//!
//! ## Architecture
//!
//! ```text
//!                         ┌─────────────┐     ┌──────────────┐
//!                    ┌───▶│ Row Cleaner │────▶│ readable.xlsx│
//! ┌─────────────┐    │    └─────────────┘     └──────────────┘
//! │ xlsx / csv  │────┤
//! │  (decoded)  │    │    ┌─────────────┐     ┌──────────────┐
//! └─────────────┘    └───▶│   Mapper    │────▶│  import.csv  │
//!                         └─────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use carload::{Converter, PipelineKind};
//!
//! let converter = Converter::with_defaults()?;
//! let output = converter.convert_file(PipelineKind::Import, "export.xlsx".as_ref())?;
//! std::fs::write(&output.file_name, &output.bytes)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - The [`Table`] model
//! - [`schema`] - Shipment field registry
//! - [`parser`] - Spreadsheet and CSV decoding
//! - [`template`] - Import template header loading
//! - [`transform`] - Cleaner, mapper, rules and pipeline
//! - [`encode`] - CSV and xlsx output
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;
pub mod schema;

// Decoding / encoding
pub mod encode;
pub mod parser;
pub mod template;

// Transformation
pub mod transform;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{DecodeError, EncodeError, PipelineError, ServerError, TemplateError};

// =============================================================================
// Re-exports - Models & schema
// =============================================================================

pub use models::{Row, Table};
pub use schema::ShipmentSchema;
pub use template::TemplateHeaders;

// =============================================================================
// Re-exports - Decoding / encoding
// =============================================================================

pub use encode::{to_csv_bytes, to_xlsx_bytes, SheetStyle};
pub use parser::{parse_bytes, parse_delimited, parse_file, ParseResult, SourceFormat};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    clean, map_to_template, map_with_report, rules_description, HeaderMapping, MappingReport,
    MappingRule,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    output_file_name, select_input, ConversionOutput, Converter, PipelineKind, Upload,
};

pub use config::Config;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
