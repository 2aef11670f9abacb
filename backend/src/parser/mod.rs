//! Tabular parsing: format detection, CSV and xlsx readers, type inference.
//!
//! The format is decided by the file extension alone (case-insensitive):
//! `.csv` is read as comma separated text, `.xlsx` as a workbook.
//! Anything else is rejected with [`IngestError::UnsupportedFormat`].

pub mod delimited;
pub mod infer;
pub mod spreadsheet;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::IngestError;
use crate::models::{ColumnType, Table, UploadedFile};

pub use delimited::{decode_content, detect_encoding, parse_csv_bytes, parse_csv_str, CsvError};
pub use infer::{column_from_text, unique_headers, NA_TOKENS};
pub use spreadsheet::parse_xlsx_bytes;

/// Tabular formats the tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    #[serde(alias = "xlsx")]
    Excel,
}

impl TableFormat {
    /// Detect the format from a file name's extension.
    pub fn from_file_name(name: &str) -> Result<Self, IngestError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("xlsx") => Ok(TableFormat::Excel),
            _ => Err(IngestError::UnsupportedFormat {
                name: name.to_string(),
            }),
        }
    }

    /// Canonical extension, with the leading dot.
    pub const fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => ".csv",
            TableFormat::Excel => ".xlsx",
        }
    }

    /// MIME type used for downloads.
    pub const fn content_type(&self) -> &'static str {
        match self {
            TableFormat::Csv => "text/csv",
            TableFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Label shown to users.
    pub const fn label(&self) -> &'static str {
        match self {
            TableFormat::Csv => "CSV",
            TableFormat::Excel => "Excel",
        }
    }
}

impl std::str::FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "excel" | "xlsx" => Ok(TableFormat::Excel),
            other => Err(format!("Unknown format '{}': expected csv or excel", other)),
        }
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub table: Table,
    /// Format detected from the file name
    pub format: TableFormat,
    /// Encoding used to decode text (CSV only)
    pub encoding: Option<String>,
}

impl ParseResult {
    /// Column names with their inferred types.
    pub fn schema(&self) -> Vec<(String, ColumnType)> {
        self.table
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.kind))
            .collect()
    }
}

/// Parse bytes in a known format.
pub fn parse_bytes(bytes: &[u8], format: TableFormat) -> Result<ParseResult, IngestError> {
    match format {
        TableFormat::Csv => {
            let (table, encoding) = parse_csv_bytes(bytes)?;
            Ok(ParseResult {
                table,
                format,
                encoding: Some(encoding),
            })
        }
        TableFormat::Excel => Ok(ParseResult {
            table: parse_xlsx_bytes(bytes)?,
            format,
            encoding: None,
        }),
    }
}

/// Detect the format of an upload and parse it.
pub fn parse_upload(file: &UploadedFile) -> Result<ParseResult, IngestError> {
    let format = TableFormat::from_file_name(&file.name)?;
    parse_bytes(&file.bytes, format)
}

/// Read and parse a file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<(UploadedFile, ParseResult), IngestError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    // Reject by extension before touching the disk
    TableFormat::from_file_name(&name)?;

    let bytes = std::fs::read(path)?;
    let file = UploadedFile::new(name, bytes);
    let parsed = parse_upload(&file)?;
    Ok((file, parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection_case_insensitive() {
        assert_eq!(TableFormat::from_file_name("a.csv").unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_file_name("A.CSV").unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_file_name("book.XLSX").unwrap(), TableFormat::Excel);
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["notes.txt", "old.xls", "noext", "csv"] {
            let err = TableFormat::from_file_name(name).unwrap_err();
            assert!(matches!(err, IngestError::UnsupportedFormat { .. }), "{}", name);
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("Excel".parse::<TableFormat>().unwrap(), TableFormat::Excel);
        assert_eq!("xlsx".parse::<TableFormat>().unwrap(), TableFormat::Excel);
        assert_eq!("CSV".parse::<TableFormat>().unwrap(), TableFormat::Csv);
        assert!("pdf".parse::<TableFormat>().is_err());
    }

    #[test]
    fn test_parse_upload() {
        let file = UploadedFile::new("people.csv", b"name,age\nAlice,30\nBob,".to_vec());
        let result = parse_upload(&file).unwrap();

        assert_eq!(result.format, TableFormat::Csv);
        assert_eq!(result.encoding.as_deref(), Some("utf-8"));
        assert_eq!(
            result.schema(),
            vec![
                ("name".to_string(), ColumnType::Text),
                ("age".to_string(), ColumnType::Float),
            ]
        );
    }

    #[test]
    fn test_parse_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.CSV");
        std::fs::write(&path, "score\n1\n2\n").unwrap();

        let (file, parsed) = parse_file(&path).unwrap();
        assert_eq!(file.name, "scores.CSV");
        assert_eq!(parsed.table.row_count(), 2);
    }
}
