//! Import template header loader.
//!
//! Reads the header row of a reference CSV and exposes it as the ordered
//! target header sequence. The sequence is loaded once and shared read-only.

use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::error::{TemplateError, TemplateResult};
use crate::models::unique_headers;

/// Header row of the bundled import template.
const BUNDLED_TEMPLATE: &str = include_str!("../../templates/import-template.csv");

/// Ordered target header names.
///
/// Names are unique: a repeated header is suffixed (`Notes`, `Notes.1`) so
/// every template column gets its own output column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateHeaders {
    headers: Vec<String>,
    /// Where the headers were read from (a path or "bundled").
    origin: String,
}

impl TemplateHeaders {
    /// Load headers from a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file, path.display().to_string())
    }

    /// Load headers from any CSV reader. Only the header row is read.
    pub fn from_reader<R: Read>(reader: R, origin: impl Into<String>) -> TemplateResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let raw: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if raw.iter().all(|h| h.is_empty()) {
            return Err(TemplateError::NoHeaders);
        }

        Ok(Self {
            headers: unique_headers(raw),
            origin: origin.into(),
        })
    }

    /// The import template shipped with the binary.
    pub fn bundled() -> TemplateResult<Self> {
        Self::from_reader(BUNDLED_TEMPLATE.as_bytes(), "bundled")
    }

    /// Load from `path` if given, the bundled template otherwise.
    pub fn load(path: Option<&Path>) -> TemplateResult<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::bundled(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
