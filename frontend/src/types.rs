//! Common types used across the frontend application.
//!
//! This module centralizes type definitions to avoid duplication
//! and ensure consistency across components.
//!
//! # Categories
//!
//! - **Log Types** - Real-time log streaming
//! - **File Types** - Uploaded files as reported by the backend
//! - **Cleaning & Chart Types** - Results of the per-file operations
//! - **Error Types** - Frontend error handling

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Log Types
// =============================================================================

/// Log severity level.
///
/// Matches the backend's log levels for SSE streaming.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }
}

/// A single log entry.
///
/// Received via SSE from `/api/logs`, or added locally by components.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting level sent by the backend
    #[serde(default)]
    pub indent: u8,
    /// Timestamp string (HH:MM:SS), set on arrival
    #[serde(default)]
    pub timestamp: String,
}

// =============================================================================
// File Types
// =============================================================================

/// Inferred column type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Integer => "int",
            ColumnType::Float => "float",
            ColumnType::Boolean => "bool",
            ColumnType::Text => "text",
        }
    }
}

/// Schema entry of a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    pub missing: usize,
}

/// Processing steps, in the order the backend records them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Uploaded,
    Previewed,
    Cleaned,
    Visualized,
    Projected,
    Exported,
}

/// Everything the UI shows for one uploaded file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: String,
    pub name: String,
    pub size: usize,
    pub size_kb: f64,
    /// "csv" or "excel"
    pub format: String,
    pub encoding: Option<String>,
    pub uploaded_at: String,
    pub row_count: usize,
    pub columns: Vec<ColumnSummary>,
    pub numeric_columns: Vec<String>,
    /// First rows, cells as plain JSON (`null` for missing)
    pub preview: Vec<Vec<Value>>,
    pub selected_columns: Vec<String>,
    pub stages: Vec<Stage>,
}

impl FileSummary {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_stage(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn record(&mut self, stage: Stage) {
        if !self.has_stage(stage) {
            self.stages.push(stage);
        }
    }

    /// Preview restricted to the selected columns, in table order.
    pub fn selected_preview(&self) -> (Vec<String>, Vec<Vec<Value>>) {
        let indices: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| self.selected_columns.contains(&c.name))
            .map(|(i, _)| i)
            .collect();

        let names = indices.iter().map(|&i| self.columns[i].name.clone()).collect();
        let rows = self
            .preview
            .iter()
            .map(|row| indices.iter().filter_map(|&i| row.get(i).cloned()).collect())
            .collect();
        (names, rows)
    }
}

/// Render a preview cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Response to session creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
}

/// Result for one uploaded file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadResult {
    Ok { file: FileSummary },
    Error { name: String, error: String },
}

/// Response from the multipart upload endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub files: Vec<UploadResult>,
}

/// Response to duplicate removal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DedupResponse {
    pub removed: usize,
    pub file: FileSummary,
}

/// Mean imputation of one column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilledColumn {
    pub column: String,
    pub mean: Option<f64>,
    pub filled: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FillReport {
    pub columns: Vec<FilledColumn>,
}

impl FillReport {
    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }
}

/// Response to mean imputation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FillResponse {
    pub report: FillReport,
    pub file: FileSummary,
}

/// Response to column selection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsResponse {
    pub selected_columns: Vec<String>,
}

// =============================================================================
// Chart Types
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub position: usize,
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub column: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Largest absolute value, used to scale the bars.
    pub fn scale(&self) -> f64 {
        self.bars
            .iter()
            .filter_map(|b| b.value)
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

/// Chart endpoint result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Visualization {
    Chart { chart: BarChart },
    Skipped { warning: String },
}

// =============================================================================
// Export Types
// =============================================================================

/// Output format picked in the conversion panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    /// Value of the `?format=` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "Excel",
        }
    }
}

/// A converted file ready for download.
#[derive(Clone, Debug, PartialEq)]
pub struct Download {
    pub file_name: String,
    /// Object URL of the blob
    pub url: String,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
///
/// Unified error type for all frontend operations.
#[derive(Clone, Debug)]
pub enum AppError {
    /// File upload failed.
    Upload(String),
    /// Network/HTTP error.
    Network(String),
    /// The backend answered with an error body.
    Server { status: u16, message: String },
    /// Invalid data format.
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Upload(msg) => write!(f, "Upload error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Server { status, message } => write!(f, "Server error ({}): {}", status, message),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_deserialization() {
        let json = r#"{
            "files": [
                {"status": "error", "name": "notes.txt", "error": "Unsupported file type: notes.txt"},
                {
                    "status": "ok",
                    "file": {
                        "id": "6f1c2f3e-35a4-4d0e-9a53-3b1f0c8e2d11",
                        "name": "sales.csv",
                        "size": 22,
                        "sizeKb": 0.021484375,
                        "format": "csv",
                        "encoding": "utf-8",
                        "uploadedAt": "2026-01-05T10:00:00Z",
                        "rowCount": 2,
                        "columns": [
                            {"name": "item", "type": "text", "missing": 0},
                            {"name": "qty", "type": "float", "missing": 1}
                        ],
                        "numericColumns": ["qty"],
                        "preview": [["pen", 3.0], ["cup", null]],
                        "selectedColumns": ["item", "qty"],
                        "stages": ["uploaded", "previewed"]
                    }
                }
            ]
        }"#;

        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.files.len(), 2);

        match &response.files[1] {
            UploadResult::Ok { file } => {
                assert_eq!(file.row_count, 2);
                assert_eq!(file.columns[1].kind, ColumnType::Float);
                assert_eq!(cell_text(&file.preview[1][1]), "");
                assert!(file.has_stage(Stage::Previewed));
                assert!(!file.has_stage(Stage::Cleaned));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_visualization_deserialization() {
        let json = r#"{"status": "chart", "chart": {"column": "v", "bars": [
            {"position": 0, "value": -4.0}, {"position": 1, "value": null}, {"position": 2, "value": 2.0}
        ]}}"#;
        match serde_json::from_str::<Visualization>(json).unwrap() {
            Visualization::Chart { chart } => assert_eq!(chart.scale(), 4.0),
            other => panic!("unexpected {:?}", other),
        }

        let json = r#"{"status": "skipped", "warning": "No numeric columns available for visualization"}"#;
        assert!(matches!(
            serde_json::from_str::<Visualization>(json).unwrap(),
            Visualization::Skipped { .. }
        ));
    }

    #[test]
    fn test_log_entry_without_timestamp() {
        let entry: LogEntry = serde_json::from_str(r#"{"level":"warning","message":"x","indent":1}"#).unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.timestamp, "");
    }

    #[test]
    fn test_selected_preview_keeps_table_order() {
        let json = r#"{
            "id": "f", "name": "people.csv", "size": 30, "sizeKb": 0.03, "format": "csv",
            "encoding": null, "uploadedAt": "2026-01-05T10:00:00Z", "rowCount": 1,
            "columns": [
                {"name": "name", "type": "text", "missing": 0},
                {"name": "age", "type": "integer", "missing": 0},
                {"name": "city", "type": "text", "missing": 0}
            ],
            "numericColumns": ["age"],
            "preview": [["Ann", 31, "Paris"]],
            "selectedColumns": ["city", "name"],
            "stages": ["uploaded", "previewed", "projected"]
        }"#;
        let file: FileSummary = serde_json::from_str(json).unwrap();

        let (names, rows) = file.selected_preview();
        assert_eq!(names, vec!["name", "city"]);
        assert_eq!(rows, vec![vec![serde_json::json!("Ann"), serde_json::json!("Paris")]]);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&serde_json::json!(true)), "True");
        assert_eq!(cell_text(&serde_json::json!("Paris")), "Paris");
        assert_eq!(cell_text(&serde_json::json!(7)), "7");
    }
}
