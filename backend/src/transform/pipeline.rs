//! High-level pipeline API: one call per file from upload to export.
//!
//! Steps, in order, each optional except the first:
//!
//! 1. Ingest: detect the format and parse the table
//! 2. Clean: remove duplicate rows, then fill numeric gaps with the mean
//! 3. Visualize: build a bar chart for one numeric column
//! 4. Project: keep the selected columns
//! 5. Export: serialize to CSV or xlsx
//!
//! Files are independent. [`run_batch`] reports every file, and a file
//! that fails does not stop the others.
//!
//! # Example
//!
//! ```rust,ignore
//! use datasweeper::{run_batch, PipelineOptions, TableFormat, UploadedFile};
//!
//! let files = vec![UploadedFile::new("sales.csv", std::fs::read("sales.csv")?)];
//! let options = PipelineOptions {
//!     remove_duplicates: true,
//!     export: Some(TableFormat::Excel),
//!     ..PipelineOptions::default()
//! };
//!
//! for outcome in run_batch(&files, &options) {
//!     println!("{}: {}", outcome.name(), outcome.is_ok());
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::chart::{visualize, Visualization};
use crate::error::{IngestError, PipelineError};
use crate::export::{export_table, ExportArtifact};
use crate::models::{ColumnSummary, Table, UploadedFile, Value};
use crate::parser::{parse_upload, TableFormat};

use super::clean::{fill_missing_with_mean, remove_duplicates, FillReport};
use super::project::project;

/// Options for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Rows shown in the preview
    pub preview_rows: usize,

    /// Remove duplicate rows
    pub remove_duplicates: bool,

    /// Fill missing numeric cells with the column mean
    pub fill_missing: bool,

    /// Build a chart
    pub visualize: bool,

    /// Column to chart (first numeric column when `None`)
    pub chart_column: Option<String>,

    /// Columns to keep (all when `None`)
    pub columns: Option<Vec<String>>,

    /// Output format (no export when `None`)
    pub export: Option<TableFormat>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            remove_duplicates: false,
            fill_missing: false,
            visualize: false,
            chart_column: None,
            columns: None,
            export: None,
        }
    }
}

/// What the pipeline did to one file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub name: String,
    /// Upload size in bytes
    pub size: usize,
    pub format: TableFormat,
    /// Encoding used to decode text (CSV only)
    pub encoding: Option<String>,
    /// Rows as parsed, before cleaning
    pub row_count: usize,
    pub schema: Vec<ColumnSummary>,
    /// First rows as parsed
    pub preview: Vec<Vec<Value>>,
    /// Rows removed as duplicates, when deduplication ran
    pub duplicates_removed: Option<usize>,
    pub fill: Option<FillReport>,
    pub visualization: Option<Visualization>,
    /// Columns kept in the output, in table order
    pub selected_columns: Vec<String>,
    pub export: Option<ExportArtifact>,
    /// The table after every step
    #[serde(skip)]
    pub table: Table,
}

/// Result of one file in a batch
#[derive(Debug)]
pub enum FileOutcome {
    Processed(Box<FileReport>),
    Failed { name: String, error: PipelineError },
}

impl FileOutcome {
    pub fn name(&self) -> &str {
        match self {
            FileOutcome::Processed(report) => &report.name,
            FileOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FileOutcome::Processed(_))
    }
}

/// Run the pipeline on one upload.
pub fn run_file(file: &UploadedFile, options: &PipelineOptions) -> Result<FileReport, PipelineError> {
    log_info(format!("📄 Processing: {} ({:.2} KB)", file.name, file.size_kb()));

    // 1. Ingest
    let parsed = parse_upload(file)?;
    let mut table = parsed.table;
    log_info_indent(
        format!(
            "{} rows, {} columns ({})",
            table.row_count(),
            table.column_count(),
            parsed.format.label()
        ),
        1,
    );

    let row_count = table.row_count();
    let schema = table.summary();
    let preview = table.head(options.preview_rows).to_records();

    // 2. Clean
    let duplicates_removed = if options.remove_duplicates {
        let removed = remove_duplicates(&mut table);
        log_info_indent(format!("Removed {} duplicate rows", removed), 1);
        Some(removed)
    } else {
        None
    };

    let fill = if options.fill_missing {
        let report = fill_missing_with_mean(&mut table);
        log_info_indent(format!("Filled {} missing values", report.total_filled()), 1);
        Some(report)
    } else {
        None
    };

    // 3. Visualize
    let visualization = if options.visualize {
        let visualization = visualize(&table, options.chart_column.as_deref())?;
        if let Visualization::Skipped { warning } = &visualization {
            log_warning(format!("{}: {}", file.name, warning));
        }
        Some(visualization)
    } else {
        None
    };

    // 4. Project
    if let Some(selection) = &options.columns {
        table = project(&table, selection)?;
    }
    let selected_columns = table.column_names();

    // 5. Export
    let export = match options.export {
        Some(format) => {
            let artifact = export_table(&table, &file.name, format)?;
            log_info_indent(
                format!("Converted to {} ({} bytes)", artifact.file_name, artifact.size()),
                1,
            );
            Some(artifact)
        }
        None => None,
    };

    log_success(format!("{} processed", file.name));

    Ok(FileReport {
        name: file.name.clone(),
        size: file.size(),
        format: parsed.format,
        encoding: parsed.encoding,
        row_count,
        schema,
        preview,
        duplicates_removed,
        fill,
        visualization,
        selected_columns,
        export,
        table,
    })
}

/// Run the pipeline on every upload, isolating failures per file.
pub fn run_batch(files: &[UploadedFile], options: &PipelineOptions) -> Vec<FileOutcome> {
    files.iter().map(|file| outcome(file, options)).collect()
}

/// Read files from disk and run the batch.
///
/// A file that cannot be read is reported like any other failure.
pub fn run_paths<P: AsRef<Path>>(paths: &[P], options: &PipelineOptions) -> Vec<FileOutcome> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            match read_upload(path, &name) {
                Ok(file) => outcome(&file, options),
                Err(error) => failed(name, error),
            }
        })
        .collect()
}

fn outcome(file: &UploadedFile, options: &PipelineOptions) -> FileOutcome {
    match run_file(file, options) {
        Ok(report) => FileOutcome::Processed(Box::new(report)),
        Err(error) => failed(file.name.clone(), error),
    }
}

fn failed(name: String, error: PipelineError) -> FileOutcome {
    log_error(format!("{}: {}", name, error));
    FileOutcome::Failed { name, error }
}

fn read_upload(path: &Path, name: &str) -> Result<UploadedFile, PipelineError> {
    // Unsupported names are rejected before touching the disk
    TableFormat::from_file_name(name)?;
    let bytes = std::fs::read(path).map_err(IngestError::from)?;
    Ok(UploadedFile::new(name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;
    use crate::parser::parse_bytes;

    fn csv(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes().to_vec())
    }

    #[test]
    fn test_unsupported_file_does_not_stop_batch() {
        let files = vec![
            csv("notes.txt", "hello"),
            csv("data.csv", "a,b\n1,x\n2,y\n"),
        ];

        let outcomes = run_batch(&files, &PipelineOptions::default());

        assert_eq!(outcomes.len(), 2);
        match &outcomes[0] {
            FileOutcome::Failed { name, error } => {
                assert_eq!(name, "notes.txt");
                assert!(matches!(
                    error,
                    PipelineError::Ingest(IngestError::UnsupportedFormat { .. })
                ));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        match &outcomes[1] {
            FileOutcome::Processed(report) => {
                assert_eq!(report.row_count, 2);
                assert_eq!(report.schema[0].kind, ColumnType::Integer);
                assert!(report.export.is_none());
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_is_isolated() {
        let files = vec![
            csv("broken.csv", "a,b\n1,2,3\n"),
            csv("fine.csv", "a\n1\n"),
        ];

        let outcomes = run_batch(&files, &PipelineOptions::default());

        assert!(!outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn test_clean_and_convert_round_trip() {
        let file = csv("Scores.CSV", "id,v\n1,1\n1,1\n2,\n3,3\n");
        let options = PipelineOptions {
            remove_duplicates: true,
            fill_missing: true,
            export: Some(TableFormat::Csv),
            ..PipelineOptions::default()
        };

        let report = run_file(&file, &options).unwrap();
        assert_eq!(report.duplicates_removed, Some(1));
        assert_eq!(report.fill.as_ref().map(FillReport::total_filled), Some(1));

        let artifact = report.export.unwrap();
        assert_eq!(artifact.file_name, "Scores.csv");
        assert_eq!(
            String::from_utf8(artifact.bytes.clone()).unwrap(),
            "id,v\n1,1.0\n2,2.0\n3,3.0\n"
        );

        // The filled column reloads as float
        let reloaded = parse_bytes(&artifact.bytes, TableFormat::Csv).unwrap().table;
        assert_eq!(reloaded.column("v").unwrap().kind, ColumnType::Float);
        assert_eq!(reloaded, report.table);
    }

    #[test]
    fn test_excel_round_trip_after_projection() {
        let file = csv("people.csv", "name,age,city\nAnn,31,Paris\nBo,,Lyon\n");
        let options = PipelineOptions {
            columns: Some(vec!["city".to_string(), "name".to_string()]),
            export: Some(TableFormat::Excel),
            ..PipelineOptions::default()
        };

        let report = run_file(&file, &options).unwrap();
        assert_eq!(report.selected_columns, vec!["name", "city"]);

        let artifact = report.export.unwrap();
        assert_eq!(artifact.file_name, "people.xlsx");

        let reloaded = parse_bytes(&artifact.bytes, TableFormat::Excel).unwrap().table;
        assert_eq!(reloaded.column_names(), vec!["name", "city"]);
        assert_eq!(reloaded.row_count(), 2);
        assert_eq!(reloaded, report.table);
    }

    #[test]
    fn test_chart_skipped_without_numeric_columns() {
        let file = csv("words.csv", "w\nalpha\nbeta\n");
        let options = PipelineOptions {
            visualize: true,
            export: Some(TableFormat::Csv),
            ..PipelineOptions::default()
        };

        let report = run_file(&file, &options).unwrap();

        assert!(matches!(report.visualization, Some(Visualization::Skipped { .. })));
        assert!(report.export.is_some());
    }

    #[test]
    fn test_unknown_projection_column_fails_file() {
        let file = csv("a.csv", "x\n1\n");
        let options = PipelineOptions {
            columns: Some(vec!["y".to_string()]),
            ..PipelineOptions::default()
        };

        assert!(matches!(run_file(&file, &options), Err(PipelineError::Table(_))));
    }

    #[test]
    fn test_preview_is_taken_before_cleaning() {
        let file = csv("p.csv", "a\n1\n1\n1\n");
        let options = PipelineOptions {
            preview_rows: 2,
            remove_duplicates: true,
            ..PipelineOptions::default()
        };

        let report = run_file(&file, &options).unwrap();

        assert_eq!(report.preview.len(), 2);
        assert_eq!(report.table.row_count(), 1);
    }

    #[test]
    fn test_run_paths_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.csv");
        std::fs::write(&path, "k\n5\n").unwrap();
        let missing = dir.path().join("absent.csv");

        let outcomes = run_paths(&[path, missing], &PipelineOptions::default());

        assert!(outcomes[0].is_ok());
        assert_eq!(outcomes[1].name(), "absent.csv");
        assert!(!outcomes[1].is_ok());
    }
}
