//! REST API types for frontend integration.
//!
//! All bodies are camelCase JSON. Errors share one shape:
//! `{"status": "error", "error": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::error::{IngestError, ServerError, SessionError};
use crate::models::{ColumnSummary, Value};
use crate::parser::TableFormat;
use crate::session::{FileEntry, Stage};
use crate::transform::FillReport;

/// Response to session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// Everything the frontend shows for one file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: Uuid,
    pub name: String,
    /// Upload size in bytes
    pub size: usize,
    pub size_kb: f64,
    pub format: TableFormat,
    pub encoding: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    /// Rows of the working table
    pub row_count: usize,
    pub columns: Vec<ColumnSummary>,
    /// Columns that can be charted
    pub numeric_columns: Vec<String>,
    /// First rows of the working table
    pub preview: Vec<Vec<Value>>,
    pub selected_columns: Vec<String>,
    pub stages: Vec<Stage>,
}

impl FileSummary {
    pub fn from_entry(entry: &FileEntry, preview_rows: usize) -> Self {
        let table = entry.table();
        Self {
            id: entry.id,
            name: entry.name.clone(),
            size: entry.size,
            size_kb: entry.size as f64 / 1024.0,
            format: entry.format,
            encoding: entry.encoding.clone(),
            uploaded_at: entry.uploaded_at,
            row_count: table.row_count(),
            columns: table.summary(),
            numeric_columns: table.numeric_columns(),
            preview: table.head(preview_rows).to_records(),
            selected_columns: entry.selection().to_vec(),
            stages: entry.stages().to_vec(),
        }
    }
}

/// Result for one uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadResult {
    Ok { file: FileSummary },
    Error { name: String, error: String },
}

/// Response to a multipart upload, one entry per file in upload order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub files: Vec<UploadResult>,
}

/// Response to duplicate removal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupResponse {
    pub removed: usize,
    pub file: FileSummary,
}

/// Response to mean imputation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResponse {
    pub report: FillReport,
    pub file: FileSummary,
}

/// `?column=` of the chart endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    pub column: Option<String>,
}

/// Body of the column selection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsRequest {
    pub columns: Vec<String>,
}

/// Response to column selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsResponse {
    pub selected_columns: Vec<String>,
}

/// `?format=` of the export endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Create an error response body
pub fn error_response(error: &str) -> JsonValue {
    json!({
        "status": "error",
        "error": error,
    })
}

impl ServerError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Session(e) => match e {
                SessionError::SessionNotFound(_) | SessionError::FileNotFound(_) => StatusCode::NOT_FOUND,
                SessionError::Ingest(IngestError::UnsupportedFormat { .. }) => StatusCode::BAD_REQUEST,
                SessionError::Ingest(_) | SessionError::Table(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SessionError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExportError, TableError};

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ServerError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                SessionError::SessionNotFound("s".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                SessionError::Ingest(IngestError::UnsupportedFormat { name: "a.txt".into() }).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                SessionError::Table(TableError::UnknownColumn("c".into())).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                SessionError::Export(ExportError::Xml("bad".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{}", error);
        }
    }

    #[test]
    fn test_error_body() {
        let body = error_response("File not found: 42");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "File not found: 42");
    }

    #[test]
    fn test_upload_result_shape() {
        let json = serde_json::to_value(UploadResult::Error {
            name: "notes.txt".into(),
            error: "Unsupported file type".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["name"], "notes.txt");
    }
}
