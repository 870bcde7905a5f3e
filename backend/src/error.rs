//! Error types for the Carload conversion pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`DecodeError`] - Uploaded file could not be read into a table
//! - [`TemplateError`] - Import template headers unavailable (configuration)
//! - [`EncodeError`] - Output table could not be serialized
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP boundary errors
//!
//! A source field missing from the input is never an error: the mapper
//! resolves it to a blank value.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors while decoding an uploaded file into a table.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited text could not be parsed.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or read.
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),

    /// Delimiter is not a single-byte character.
    #[error("Unsupported delimiter: {0:?}")]
    InvalidDelimiter(char),

    /// Workbook has no worksheet.
    #[error("Spreadsheet has no worksheet")]
    NoWorksheet,

    /// Empty file.
    #[error("File is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No header row found")]
    NoHeaders,
}

// =============================================================================
// Template Errors
// =============================================================================

/// Errors loading the import template header sequence.
///
/// These are configuration errors: the template mapper cannot run without
/// a header sequence.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file could not be read.
    #[error("Cannot read import template '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Template header row could not be parsed.
    #[error("Invalid import template: {0}")]
    Csv(#[from] csv::Error),

    /// Template has no header names.
    #[error("Import template has no headers")]
    NoHeaders,
}

// =============================================================================
// Encode Errors
// =============================================================================

/// Errors while serializing an output table.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// CSV writer failed.
    #[error("CSV encode error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet writer failed.
    #[error("Spreadsheet encode error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Table exceeds the spreadsheet grid.
    #[error("Table too large for a spreadsheet: {0}")]
    TooLarge(String),

    /// Flushing the writer failed.
    #[error("Encode IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::Converter`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input decoding error.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Template configuration error.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Output encoding error.
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Neither named input was supplied.
    #[error("No file uploaded")]
    NoInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Pipeline(PipelineError::Decode(_))
            | ServerError::Pipeline(PipelineError::NoInput)
            | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "status": "error",
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for template loading.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Result type for encode operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // DecodeError -> PipelineError
        let decode_err = DecodeError::EmptyFile;
        let pipeline_err: PipelineError = decode_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // TemplateError -> PipelineError
        let template_err = TemplateError::NoHeaders;
        let pipeline_err: PipelineError = template_err.into();
        assert!(pipeline_err.to_string().contains("no headers"));
    }

    #[test]
    fn test_no_input_message() {
        let err: ServerError = PipelineError::NoInput.into();
        assert_eq!(err.to_string(), "No file uploaded");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        let decode: ServerError = PipelineError::Decode(DecodeError::NoHeaders).into();
        assert_eq!(decode.status(), StatusCode::BAD_REQUEST);

        let template: ServerError = PipelineError::Template(TemplateError::NoHeaders).into();
        assert_eq!(template.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let internal = ServerError::Internal("boom".into());
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
