//! Domain models for the Data Sweeper pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Value`] - A single cell (missing, boolean, integer, float or text)
//! - [`ColumnType`] - Inferred type of a column
//! - [`Column`] - A named, typed sequence of values
//! - [`Table`] - Ordered columns sharing one row count
//! - [`ColumnSummary`] - Per-column schema line
//! - [`UploadedFile`] - Raw upload payload with its declared name

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TableError;

// =============================================================================
// Cell Values
// =============================================================================

/// A single cell value.
///
/// Serialized untagged, so `Missing` becomes JSON `null` and the other
/// variants their natural JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent, empty or NA cell.
    Missing,
    /// Boolean cell.
    Bool(bool),
    /// Integer cell.
    Int(i64),
    /// Floating point cell. Never NaN: NaN is represented as `Missing`.
    Float(f64),
    /// Text cell, kept verbatim.
    Text(String),
}

impl Value {
    /// Build a float value, mapping NaN to `Missing`.
    pub fn float(value: f64) -> Self {
        if value.is_nan() {
            Value::Missing
        } else {
            Value::Float(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the value, used by cleaning and charting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text form used when writing delimited text.
    ///
    /// Missing cells become empty fields, booleans are `True`/`False`
    /// and whole floats keep a trailing `.0` so they reload as floats.
    pub fn to_field(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "NaN"),
            other => write!(f, "{}", other.to_field()),
        }
    }
}

/// Format a float the way it is written to CSV.
pub fn format_float(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Column Types
// =============================================================================

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Whole numbers, no gaps.
    Integer,
    /// Numbers with a fractional part, or integers with gaps.
    Float,
    /// `True`/`False` values.
    Boolean,
    /// Anything else.
    Text,
}

impl ColumnType {
    /// Whether the column takes part in cleaning and charting.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Columns and Tables
// =============================================================================

/// A named column of values sharing one inferred type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }
}

/// Schema entry shown next to a preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    pub missing: usize,
}

/// An in-memory table: ordered columns and an explicit row count.
///
/// The row count is stored so that a projection onto zero columns keeps
/// the height of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        Self::with_rows(columns, rows)
    }

    /// Build a table with an explicit row count.
    pub fn with_rows(columns: Vec<Column>, rows: usize) -> Result<Self, TableError> {
        if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
            return Err(TableError::RaggedColumn {
                column: bad.name.clone(),
                expected: rows,
                found: bad.values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Iterate rows as vectors of borrowed values.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.rows).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Keep only the rows whose flag is `true`.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.values.retain(|_| *flags.next().unwrap_or(&true));
        }
        self.rows = keep.iter().filter(|k| **k).count();
    }

    /// First `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        let rows = n.min(self.rows);
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.kind, c.values[..rows].to_vec()))
            .collect();
        Table { columns, rows }
    }

    /// Name, type and missing count of every column.
    pub fn summary(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|c| ColumnSummary {
                name: c.name.clone(),
                kind: c.kind,
                missing: c.missing_count(),
            })
            .collect()
    }

    /// Rows as JSON-friendly vectors, used for previews.
    pub fn to_records(&self) -> Vec<Vec<Value>> {
        self.rows()
            .map(|row| row.into_iter().cloned().collect())
            .collect()
    }
}

// =============================================================================
// Uploaded Files
// =============================================================================

/// A file as received from the user.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Declared file name, including its extension.
    pub name: String,
    /// Raw payload.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Payload size in kilobytes, as shown to the user.
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}
