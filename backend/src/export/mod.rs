//! Table export to downloadable files.
//!
//! - [`delimited`] - comma separated text
//! - [`workbook`] - single-sheet xlsx workbook
//!
//! [`export_table`] picks the writer for a [`TableFormat`] and names the
//! result after the uploaded file.

pub mod delimited;
pub mod workbook;

use serde::Serialize;

use crate::error::ExportError;
use crate::models::Table;
use crate::parser::TableFormat;

pub use delimited::write_csv;
pub use workbook::{column_letters, write_xlsx};

/// A serialized table ready to be downloaded or written to disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    /// Download name, derived from the uploaded name.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
    pub format: TableFormat,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Name of the converted file.
///
/// The final extension is replaced whatever its case (`Data.CSV` becomes
/// `Data.xlsx`); a name without an extension gets one appended.
pub fn derive_file_name(original: &str, format: TableFormat) -> String {
    let stem = match original.rfind('.') {
        Some(dot) if dot > 0 => &original[..dot],
        _ => original,
    };
    format!("{}{}", stem, format.extension())
}

/// Serialize `table` in `format`, naming the output after `original_name`.
pub fn export_table(
    table: &Table,
    original_name: &str,
    format: TableFormat,
) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        TableFormat::Csv => write_csv(table)?,
        TableFormat::Excel => write_xlsx(table)?,
    };

    Ok(ExportArtifact {
        file_name: derive_file_name(original_name, format),
        content_type: format.content_type(),
        format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnType, Value};

    #[test]
    fn test_derive_file_name() {
        assert_eq!(derive_file_name("sales.csv", TableFormat::Excel), "sales.xlsx");
        assert_eq!(derive_file_name("Data.CSV", TableFormat::Excel), "Data.xlsx");
        assert_eq!(derive_file_name("book.XLSX", TableFormat::Csv), "book.csv");
        assert_eq!(derive_file_name("q1.report.xlsx", TableFormat::Csv), "q1.report.csv");
        assert_eq!(derive_file_name("report", TableFormat::Csv), "report.csv");
        assert_eq!(derive_file_name("same.csv", TableFormat::Csv), "same.csv");
    }

    #[test]
    fn test_export_excel_artifact() {
        let table = Table::new(vec![Column::new(
            "n",
            ColumnType::Integer,
            vec![Value::Int(1), Value::Int(2)],
        )])
        .unwrap();

        let artifact = export_table(&table, "numbers.csv", TableFormat::Excel).unwrap();

        assert_eq!(artifact.file_name, "numbers.xlsx");
        assert_eq!(
            artifact.content_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert!(artifact.size() > 0);
    }

    #[test]
    fn test_export_csv_artifact() {
        let table = Table::new(vec![Column::new("n", ColumnType::Integer, vec![Value::Int(7)])]).unwrap();

        let artifact = export_table(&table, "in.xlsx", TableFormat::Csv).unwrap();

        assert_eq!(artifact.file_name, "in.csv");
        assert_eq!(artifact.content_type, "text/csv");
        assert_eq!(artifact.bytes, b"n\n7\n".to_vec());
    }
}
