//! High-level conversion API.
//!
//! Combines decoding, one of the two transformation branches, and encoding:
//!
//! - [`PipelineKind::Readable`]: raw export -> row cleaner -> styled xlsx
//! - [`PipelineKind::Import`]: table -> template mapper -> CSV
//!
//! The two branches are never chained in one conversion.
//!
//! # Example
//!
//! ```rust,ignore
//! use carload::transform::pipeline::{Converter, PipelineKind};
//!
//! let converter = Converter::with_defaults()?;
//! let bytes = std::fs::read("export.xlsx")?;
//! let output = converter.convert_bytes(PipelineKind::Readable, &bytes)?;
//! std::fs::write(&output.file_name, &output.bytes)?;
//! ```

use chrono::{DateTime, Datelike, Local, TimeZone};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use super::cleaner::clean;
use super::mapper::map_with_report;
use super::mapping::HeaderMapping;
use crate::api::logs::JobLog;
use crate::encode::{to_csv_bytes, to_xlsx_bytes, SheetStyle};
use crate::error::{PipelineError, PipelineResult, TemplateResult};
use crate::models::Table;
use crate::parser::{parse_bytes, parse_file, ParseResult};
use crate::schema::ShipmentSchema;
use crate::template::TemplateHeaders;

/// Which branch a conversion runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Clean and reorder for human review
    Readable,
    /// Map onto the import template
    Import,
}

impl PipelineKind {
    /// File name suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            PipelineKind::Readable => "readable",
            PipelineKind::Import => "superdispatch",
        }
    }

    /// File extension of the encoded output
    pub fn extension(&self) -> &'static str {
        match self {
            PipelineKind::Readable => "xlsx",
            PipelineKind::Import => "csv",
        }
    }

    /// MIME type of the encoded output
    pub fn content_type(&self) -> &'static str {
        match self {
            PipelineKind::Readable => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            PipelineKind::Import => "text/csv",
        }
    }
}

/// An uploaded file
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// An upload without a file name or content counts as not supplied
    pub fn is_present(&self) -> bool {
        self.file_name.as_deref().is_some_and(|n| !n.trim().is_empty()) || !self.bytes.is_empty()
    }
}

/// Pick the branch from the two named inputs; `origin` wins when both are set.
pub fn select_input(
    origin: Option<Upload>,
    processed: Option<Upload>,
) -> PipelineResult<(PipelineKind, Upload)> {
    match (origin, processed) {
        (Some(o), _) if o.is_present() => Ok((PipelineKind::Readable, o)),
        (_, Some(p)) if p.is_present() => Ok((PipelineKind::Import, p)),
        _ => Err(PipelineError::NoInput),
    }
}

/// Output file name, e.g. `March_5_readable.xlsx`
pub fn output_file_name<Tz: TimeZone>(kind: PipelineKind, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}.{}",
        now.format("%B"),
        now.day(),
        kind.suffix(),
        kind.extension()
    )
}

/// Result of a complete conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub kind: PipelineKind,
    /// Encoded file
    pub bytes: Vec<u8>,
    /// Suggested download name
    pub file_name: String,
    pub content_type: &'static str,
    /// Transformed table, before encoding
    pub table: Table,
}

/// Shared, read-only conversion configuration
#[derive(Debug, Clone)]
pub struct Converter {
    schema: Arc<ShipmentSchema>,
    template: Arc<TemplateHeaders>,
    mapping: Arc<HeaderMapping>,
    style: SheetStyle,
}

impl Converter {
    pub fn new(schema: ShipmentSchema, template: TemplateHeaders, mapping: HeaderMapping) -> Self {
        Self {
            schema: Arc::new(schema),
            template: Arc::new(template),
            mapping: Arc::new(mapping),
            style: SheetStyle::default(),
        }
    }

    /// Default schema and mapping with the template at `template_path`
    /// (bundled template when `None`)
    pub fn load(template_path: Option<&Path>) -> TemplateResult<Self> {
        let template = TemplateHeaders::load(template_path)?;
        Ok(Self::new(ShipmentSchema::default(), template, HeaderMapping::default()))
    }

    /// Default schema, mapping and bundled template
    pub fn with_defaults() -> TemplateResult<Self> {
        Self::load(None)
    }

    pub fn schema(&self) -> &ShipmentSchema {
        &self.schema
    }

    pub fn template(&self) -> &TemplateHeaders {
        &self.template
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    /// Mapped headers absent from the loaded template
    pub fn coverage_gaps(&self) -> Vec<String> {
        self.mapping.unused_headers(self.template.headers())
    }

    /// Readable branch on an already decoded table
    pub fn readable_table(&self, table: Table) -> Table {
        clean(table, &self.schema)
    }

    /// Import branch on an already decoded table
    pub fn import_table(&self, table: &Table) -> Table {
        map_with_report(table, self.template.headers(), &self.mapping).0
    }

    /// Decode, transform and encode a file
    pub fn convert_file(&self, kind: PipelineKind, path: &Path) -> PipelineResult<ConversionOutput> {
        let log = JobLog::start();
        log.info(format!("📄 Reading {}", path.display()));
        let parsed = parse_file(path)?;
        self.convert_parsed(kind, parsed, &log)
    }

    /// Decode, transform and encode uploaded bytes
    pub fn convert_bytes(&self, kind: PipelineKind, bytes: &[u8]) -> PipelineResult<ConversionOutput> {
        let log = JobLog::start();
        self.convert_bytes_logged(kind, bytes, &log)
    }

    /// Same as [`Converter::convert_bytes`], reporting to an existing job log
    pub fn convert_bytes_logged(
        &self,
        kind: PipelineKind,
        bytes: &[u8],
        log: &JobLog,
    ) -> PipelineResult<ConversionOutput> {
        log.info(format!("📖 Decoding upload ({} bytes)...", bytes.len()));
        let parsed = parse_bytes(bytes).map_err(|e| {
            log.error(format!("Cannot decode input: {}", e));
            e
        })?;
        self.convert_parsed(kind, parsed, log)
    }

    fn convert_parsed(
        &self,
        kind: PipelineKind,
        parsed: ParseResult,
        log: &JobLog,
    ) -> PipelineResult<ConversionOutput> {
        let ParseResult { table, format } = parsed;
        log.success(format!("Detected {}", format));
        log.success(format!(
            "Read {} rows, {} columns",
            table.len(),
            table.headers().len()
        ));
        if table.is_empty() {
            log.warning("Input has no data rows, output will only carry headers");
        }

        let (table, bytes) = match kind {
            PipelineKind::Readable => {
                log.info("🧹 Cleaning columns for review...");
                let cleaned = self.readable_table(table);
                log.info_indent(format!("Columns: {}", cleaned.headers().join(", ")), 1);
                let bytes = to_xlsx_bytes(&cleaned, &self.style)?;
                (cleaned, bytes)
            }
            PipelineKind::Import => {
                log.info(format!(
                    "🔄 Mapping onto {} template headers ({})...",
                    self.template.len(),
                    self.template.origin()
                ));
                let (mapped, report) =
                    map_with_report(&table, self.template.headers(), &self.mapping);
                log.info_indent(report.summary(), 1);
                let bytes = to_csv_bytes(&mapped)?;
                (mapped, bytes)
            }
        };

        let file_name = output_file_name(kind, &Local::now());
        log.success(format!("Wrote {} ({} rows, {} bytes)", file_name, table.len(), bytes.len()));

        Ok(ConversionOutput {
            kind,
            bytes,
            file_name,
            content_type: kind.content_type(),
            table,
        })
    }
}
