//! Excel (.xlsx) parsing.
//!
//! Reads the first worksheet with calamine; the first non-empty row holds
//! the column names and every following row is data. Leading empty rows
//! are skipped. Leading empty columns are kept as unnamed, all-missing
//! columns so a sheet starting at `B2` has the same shape as its CSV
//! export.

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use super::infer::{build_column, unique_headers, Cell, NA_TOKENS};
use crate::error::IngestError;
use crate::models::Table;

/// Parse the first sheet of an xlsx workbook.
pub fn parse_xlsx_bytes(bytes: &[u8]) -> Result<Table, IngestError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::Xlsx("Workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(row) => row,
        None => return Ok(Table::empty()),
    };

    // Calamine's range starts at the first used cell, not at A1
    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let raw_headers = std::iter::repeat(String::new())
        .take(offset)
        .chain(header.iter().map(header_text))
        .collect();
    let headers = unique_headers(raw_headers);
    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    let mut height = 0;

    for row in rows {
        if row.iter().all(|d| matches!(d, Data::Empty)) {
            continue;
        }
        for (i, column) in cells.iter_mut().enumerate() {
            let cell = i.checked_sub(offset).and_then(|j| row.get(j));
            column.push(cell.map(classify).unwrap_or(Cell::Missing));
        }
        height += 1;
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| build_column(name, cells, None))
        .collect();

    Ok(Table::with_rows(columns, height)?)
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Classify a typed spreadsheet cell.
///
/// Whole floats count as integers: xlsx stores every number as a float.
fn classify(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) if f.is_nan() => Cell::Missing,
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Cell::Int(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if NA_TOKENS.contains(&s.as_str()) => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}
