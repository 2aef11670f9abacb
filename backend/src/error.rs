//! Error types for the Data Sweeper pipeline.
//!
//! This module defines one error type per layer:
//!
//! - [`IngestError`] - Format detection and parsing errors
//! - [`TableError`] - Column lookups and table construction
//! - [`ExportError`] - Serialization errors
//! - [`SessionError`] - Session store lookups and per-file operations
//! - [`PipelineError`] - Batch pipeline errors (one per file)
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors while turning an uploaded file into a table.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file extension is neither `.csv` nor `.xlsx`.
    #[error("Unsupported file format for '{name}': expected .csv or .xlsx")]
    UnsupportedFormat { name: String },

    /// Malformed delimited text.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] crate::parser::CsvError),

    /// Malformed spreadsheet.
    #[error("Invalid spreadsheet: {0}")]
    Xlsx(String),

    /// Payload could not be decoded to text.
    #[error("Failed to decode content as {encoding}")]
    Encoding { encoding: String },

    /// Parsed columns did not line up.
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),

    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::XlsxError> for IngestError {
    fn from(err: calamine::XlsxError) -> Self {
        IngestError::Xlsx(err.to_string())
    }
}

// =============================================================================
// Table Errors
// =============================================================================

/// Errors from table construction and column lookups.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    /// A column name that is not in the table.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A column that exists but does not hold numbers.
    #[error("Column '{0}' is not numeric")]
    ColumnNotNumeric(String),

    /// Columns of different lengths.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while serializing a table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet archive failure.
    #[error("Spreadsheet archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Spreadsheet XML failure.
    #[error("Spreadsheet XML error: {0}")]
    Xml(String),

    /// A value the target format cannot hold.
    #[error("Cannot write value '{value}' in column '{column}' (row {row})")]
    Unrepresentable {
        column: String,
        row: usize,
        value: String,
    },

    /// IO error while buffering output.
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session with this id (never created, ended or evicted).
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// No file with this id in the session.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Upload could not be ingested.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Column selection or chart request was invalid.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Export failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Errors of a single file's pipeline run.
///
/// A batch run captures one of these per failing file and keeps going.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ingestion failed (unsupported format or unparseable content).
    #[error("{0}")]
    Ingest(#[from] IngestError),

    /// Projection or chart request referenced bad columns.
    #[error("{0}")]
    Table(#[from] TableError),

    /// Export failed.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Session store error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // IngestError -> PipelineError
        let err = IngestError::UnsupportedFormat { name: "notes.txt".into() };
        let pipeline_err: PipelineError = err.into();
        assert!(pipeline_err.to_string().contains("notes.txt"));

        // TableError -> SessionError -> ServerError
        let session_err: SessionError = TableError::UnknownColumn("price".into()).into();
        let server_err: ServerError = session_err.into();
        assert!(server_err.to_string().contains("price"));
    }

    #[test]
    fn test_unrepresentable_format() {
        let err = ExportError::Unrepresentable {
            column: "price".into(),
            row: 3,
            value: "inf".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("price"));
        assert!(msg.contains("row 3"));
    }
}
