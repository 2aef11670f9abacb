//! Column type inference.
//!
//! Rules, applied per column:
//!
//! 1. Exact NA tokens, empty and absent cells are missing. Whitespace
//!    alone is text; numbers and booleans are matched after trimming.
//! 2. At least one row, no missing cells, all integers: `Integer`.
//! 3. All non-missing cells numeric (or all cells missing): `Float`.
//! 4. All non-missing cells boolean tokens: `Boolean`.
//! 5. Otherwise `Text`, keeping the original text.

use crate::models::{Column, ColumnType, Value};

/// Tokens read as missing values.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A cell classified before the column type is known.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Missing,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Classify a text cell.
    pub(crate) fn from_text(raw: &str) -> Cell {
        if NA_TOKENS.contains(&raw) {
            return Cell::Missing;
        }
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return if f.is_nan() { Cell::Missing } else { Cell::Float(f) };
        }
        match trimmed {
            "True" | "true" | "TRUE" => Cell::Bool(true),
            "False" | "false" | "FALSE" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    /// Display text of a non-text cell, used when a column falls back to text.
    fn display(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => Value::Float(*f).to_field(),
            Cell::Bool(b) => Value::Bool(*b).to_field(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Infer the type of a column from classified cells.
pub(crate) fn infer_kind(cells: &[Cell]) -> ColumnType {
    if cells.is_empty() {
        return ColumnType::Text;
    }

    let all_int = cells.iter().all(|c| matches!(c, Cell::Int(_)));
    if all_int {
        return ColumnType::Integer;
    }

    let all_numeric = cells
        .iter()
        .all(|c| matches!(c, Cell::Int(_) | Cell::Float(_) | Cell::Missing));
    if all_numeric {
        return ColumnType::Float;
    }

    let all_bool = cells.iter().all(|c| matches!(c, Cell::Bool(_) | Cell::Missing));
    if all_bool {
        return ColumnType::Boolean;
    }

    ColumnType::Text
}

/// Build a column from classified cells.
///
/// `originals` holds the source text of each cell when there is one, so
/// text columns keep exactly what was written.
pub(crate) fn build_column(name: String, cells: Vec<Cell>, originals: Option<Vec<Option<String>>>) -> Column {
    let kind = infer_kind(&cells);
    let mut originals = originals.map(|o| o.into_iter());

    let values = cells
        .into_iter()
        .map(|cell| {
            let original = originals.as_mut().and_then(|o| o.next()).flatten();
            match (kind, cell) {
                (_, Cell::Missing) => Value::Missing,
                (ColumnType::Integer, Cell::Int(i)) => Value::Int(i),
                (ColumnType::Float, Cell::Int(i)) => Value::Float(i as f64),
                (ColumnType::Float, Cell::Float(f)) => Value::float(f),
                (ColumnType::Boolean, Cell::Bool(b)) => Value::Bool(b),
                (_, cell) => Value::Text(original.unwrap_or_else(|| cell.display())),
            }
        })
        .collect();

    Column::new(name, kind, values)
}

/// Build a column from raw text cells (`None` for absent fields).
pub fn column_from_text(name: String, raw: Vec<Option<String>>) -> Column {
    let cells = raw
        .iter()
        .map(|cell| match cell {
            Some(text) => Cell::from_text(text),
            None => Cell::Missing,
        })
        .collect();
    build_column(name, cells, Some(raw))
}

/// Make header names usable as column keys.
///
/// Empty names become `Unnamed: <index>` and repeated names get a
/// `.1`, `.2`, ... suffix.
pub fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());

    for (index, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.push(candidate);
    }

    seen
}
