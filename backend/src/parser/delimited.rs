//! CSV parsing with encoding detection.
//!
//! Comma separated, header row first. Bytes are read as UTF-8 and only
//! fall back to detection when they are not valid UTF-8.

use csv::ReaderBuilder;

use super::infer::{column_from_text, unique_headers};
use crate::error::IngestError;
use crate::models::Table;

/// CSV parsing error with the line it was found on
#[derive(Debug, Clone, PartialEq)]
pub struct CsvError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> Result<String, IngestError> {
    let decoder = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            return String::from_utf8(bytes.to_vec()).map_err(|_| IngestError::Encoding {
                encoding: encoding.to_string(),
            });
        }
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252,
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252,
        other => encoding_rs::Encoding::for_label(other.as_bytes()).unwrap_or(encoding_rs::WINDOWS_1252),
    };

    let (text, _, had_errors) = decoder.decode(bytes);
    if had_errors {
        return Err(IngestError::Encoding {
            encoding: encoding.to_string(),
        });
    }
    Ok(text.into_owned())
}

/// Decode a payload: UTF-8 first, detected encoding otherwise.
///
/// Returns the text (without byte-order mark) and the encoding used.
pub fn decode_auto(bytes: &[u8]) -> Result<(String, String), IngestError> {
    let (text, encoding) = match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), "utf-8".to_string()),
        Err(_) => {
            let detected = detect_encoding(bytes);
            match decode_content(bytes, &detected) {
                Ok(text) => (text, detected),
                // Single-byte fallback: every byte maps to a character
                Err(_) => (
                    decode_content(bytes, "windows-1252")?,
                    "windows-1252".to_string(),
                ),
            }
        }
    };
    let text = match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    };
    Ok((text, encoding))
}

/// Parse comma separated text into a table.
///
/// Blank lines are skipped, short rows are padded with missing cells and
/// rows with more fields than the header are rejected.
pub fn parse_csv_str(content: &str) -> Result<Table, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header = loop {
        match records.next() {
            None => return Err(CsvError::new(1, "No columns to parse from file")),
            Some(Err(e)) => return Err(csv_failure(e)),
            Some(Ok(record)) if is_blank(&record) => continue,
            Some(Ok(record)) => break record,
        }
    };

    let headers = unique_headers(header.iter().map(|s| s.to_string()).collect());
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in records {
        let record = result.map_err(csv_failure)?;
        if is_blank(&record) {
            continue;
        }

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        if record.len() > headers.len() {
            return Err(CsvError::new(
                line,
                format!("Expected {} fields, saw {}", headers.len(), record.len()),
            ));
        }

        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).map(|s| s.to_string()));
        }
    }

    let rows = cells.first().map(|c| c.len()).unwrap_or(0);
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| column_from_text(name, raw))
        .collect();

    Table::with_rows(columns, rows).map_err(|e| CsvError::new(0, e.to_string()))
}

/// Parse CSV bytes with encoding detection.
///
/// Returns the table and the encoding that was used.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<(Table, String), IngestError> {
    let (content, encoding) = decode_auto(bytes)?;
    let table = parse_csv_str(&content)?;
    Ok((table, encoding))
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 0 || (record.len() == 1 && record[0].is_empty())
}

fn csv_failure(error: csv::Error) -> CsvError {
    let line = error.position().map(|p| p.line() as usize).unwrap_or(0);
    CsvError::new(line, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnType, Value};

    #[test]
    fn test_simple_csv() {
        let table = parse_csv_str("name,age\nAlice,30\nBob,25").unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["name", "age"]);
        assert_eq!(table.column("age").unwrap().kind, ColumnType::Integer);
        assert_eq!(table.row(0).unwrap(), vec![&Value::Text("Alice".into()), &Value::Int(30)]);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,value\n\"Alice\",\"Hello, World\"";
        let table = parse_csv_str(csv).unwrap();

        assert_eq!(table.row(0).unwrap()[1], &Value::Text("Hello, World".into()));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_csv_str("a,b\n1,2\n\n3,4\n").unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_short_rows_padded() {
        let table = parse_csv_str("a,b,c\n1,,3\n4").unwrap();

        assert_eq!(table.row_count(), 2);
        let b = table.column("b").unwrap();
        assert_eq!(b.values, vec![Value::Missing, Value::Missing]);
        assert_eq!(table.column("c").unwrap().values, vec![Value::Float(3.0), Value::Missing]);
    }

    #[test]
    fn test_extra_fields_rejected() {
        let err = parse_csv_str("a,b\n1,2\n1,2,3,4").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("Expected 2 fields"));
    }

    #[test]
    fn test_error_message_format() {
        let err = CsvError::new(5, "Invalid value");
        assert_eq!(err.to_string(), "Line 5: Invalid value");
    }

    #[test]
    fn test_empty_csv_error() {
        let err = parse_csv_str("").unwrap_err();
        assert!(err.message.contains("No columns"));
    }

    #[test]
    fn test_header_only() {
        let table = parse_csv_str("a,b\n").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = b"\xEF\xBB\xBFid,name\n1,x";
        let (table, encoding) = parse_csv_bytes(bytes).unwrap();
        assert_eq!(encoding, "utf-8");
        assert_eq!(table.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_non_utf8_payload_is_decoded() {
        // "nom\nSociété" with Latin-1 accents
        let mut bytes = b"nom\nSoci".to_vec();
        bytes.extend_from_slice(&[0xE9, 0x74, 0xE9]);
        let (table, encoding) = parse_csv_bytes(&bytes).unwrap();

        assert_ne!(encoding, "utf-8");
        match &table.column("nom").unwrap().values[0] {
            Value::Text(s) => assert!(s.starts_with("Soci")),
            other => panic!("expected text, got {:?}", other),
        }
    }
}
