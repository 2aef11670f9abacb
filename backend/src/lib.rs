//! # Data Sweeper - Clean, chart and convert tables
//!
//! Data Sweeper takes CSV and Excel files, shows what is in them, cleans
//! them (duplicate rows, missing numbers), charts a numeric column and
//! converts them to CSV or Excel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / XLSX  │────▶│   Parser    │────▶│  Transform  │────▶│   Export    │
//! │  (upload)   │     │ (typed cols)│     │(clean, cols)│     │ (csv/xlsx)  │
//! └─────────────┘     └─────────────┘     └──────┬──────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │    Chart    │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use datasweeper::{run_batch, PipelineOptions, TableFormat, UploadedFile};
//!
//! let file = UploadedFile::new("sales.csv", std::fs::read("sales.csv")?);
//! let options = PipelineOptions {
//!     remove_duplicates: true,
//!     fill_missing: true,
//!     export: Some(TableFormat::Excel),
//!     ..PipelineOptions::default()
//! };
//! let outcomes = run_batch(&[file], &options);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Cells, columns and tables
//! - [`parser`] - CSV and xlsx parsing with type inference
//! - [`transform`] - Cleaning, projection and the batch pipeline
//! - [`chart`] - Bar chart requests and a text renderer
//! - [`export`] - CSV and xlsx writers
//! - [`session`] - In-memory per-user state
//! - [`config`] - Server settings from the environment
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod chart;
pub mod transform;

// Export
pub mod export;

// Sessions
pub mod session;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ExportError,
    IngestError,
    PipelineError,
    ServerError,
    SessionError,
    TableError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Column,
    ColumnSummary,
    ColumnType,
    Table,
    UploadedFile,
    Value,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    parse_bytes,
    parse_file,
    parse_upload,
    CsvError,
    ParseResult,
    TableFormat,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    fill_missing_with_mean,
    project,
    remove_duplicates,
    run_batch,
    run_file,
    run_paths,
    FileOutcome,
    FileReport,
    FillReport,
    PipelineOptions,
};

// =============================================================================
// Re-exports - Chart and Export
// =============================================================================

pub use chart::{visualize, BarChart, ChartRenderer, TextChartRenderer, Visualization};
pub use export::{derive_file_name, export_table, ExportArtifact};

// =============================================================================
// Re-exports - Sessions and API
// =============================================================================

pub use config::ServerConfig;
pub use session::{FileEntry, SessionStore, Stage};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
