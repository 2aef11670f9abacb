//! Row deduplication and mean imputation.
//!
//! Both operations work in place and are idempotent: running one twice
//! leaves the table as it was after the first run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Table, Value};

/// Hashable view of a cell, used to compare whole rows.
///
/// Missing equals missing; floats compare by bit pattern with `-0.0`
/// folded into `0.0`.
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Missing,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(&'a str),
}

impl<'a> From<&'a Value> for CellKey<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Missing => CellKey::Missing,
            Value::Bool(b) => CellKey::Bool(*b),
            Value::Int(i) => CellKey::Int(*i),
            Value::Float(f) if *f == 0.0 => CellKey::Float(0.0f64.to_bits()),
            Value::Float(f) => CellKey::Float(f.to_bits()),
            Value::Text(s) => CellKey::Text(s),
        }
    }
}

/// Remove rows identical to an earlier row, keeping the first occurrence.
///
/// Returns the number of rows removed.
pub fn remove_duplicates(table: &mut Table) -> usize {
    let keep = first_occurrences(table);

    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        table.retain_rows(&keep);
    }
    removed
}

/// One flag per row: `true` for the first occurrence of each distinct row.
fn first_occurrences(table: &Table) -> Vec<bool> {
    let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(table.row_count());
    let mut keep = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        keep.push(seen.insert(row.into_iter().map(CellKey::from).collect()));
    }
    keep
}

/// What mean imputation did to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledColumn {
    pub column: String,
    /// Mean of the non-missing values, `None` when the column is all missing.
    pub mean: Option<f64>,
    /// Number of cells replaced.
    pub filled: usize,
}

/// Summary of a fill run over every numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub columns: Vec<FilledColumn>,
}

impl FillReport {
    /// Total number of cells replaced.
    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }
}

/// Replace missing numeric cells with their column mean.
///
/// Non-numeric columns are never touched. A numeric column with no
/// values at all has no mean and is left as it is, as is a column whose
/// mean is NaN (it holds both `inf` and `-inf`).
pub fn fill_missing_with_mean(table: &mut Table) -> FillReport {
    let mut report = FillReport::default();

    for column in table.columns_mut().iter_mut().filter(|c| c.kind.is_numeric()) {
        let present: Vec<f64> = column.values.iter().filter_map(Value::as_f64).collect();
        let mean = if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        };
        let mean = mean.filter(|m| !m.is_nan());

        let mut filled = 0;
        if let Some(mean) = mean {
            for value in column.values.iter_mut().filter(|v| v.is_missing()) {
                *value = Value::Float(mean);
                filled += 1;
            }
        }

        report.columns.push(FilledColumn {
            column: column.name.clone(),
            mean,
            filled,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnType};

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn pairs(rows: &[(i64, &str)]) -> Table {
        Table::new(vec![
            Column::new("n", ColumnType::Integer, rows.iter().map(|r| Value::Int(r.0)).collect()),
            Column::new("s", ColumnType::Text, rows.iter().map(|r| text(r.1)).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let mut table = pairs(&[(1, "a"), (1, "a"), (2, "b")]);
        let removed = remove_duplicates(&mut table);

        assert_eq!(removed, 1);
        assert_eq!(table, pairs(&[(1, "a"), (2, "b")]));
    }

    #[test]
    fn test_remove_duplicates_idempotent() {
        let mut once = pairs(&[(2, "b"), (1, "a"), (2, "b"), (1, "a"), (3, "c")]);
        remove_duplicates(&mut once);
        let mut twice = once.clone();

        assert_eq!(remove_duplicates(&mut twice), 0);
        assert_eq!(once, twice);
        assert_eq!(once, pairs(&[(2, "b"), (1, "a"), (3, "c")]));
    }

    #[test]
    fn test_missing_cells_compare_equal() {
        let mut table = Table::new(vec![Column::new(
            "x",
            ColumnType::Float,
            vec![Value::Missing, Value::Float(1.0), Value::Missing, Value::Float(-0.0), Value::Float(0.0)],
        )])
        .unwrap();

        assert_eq!(remove_duplicates(&mut table), 2);
        assert_eq!(
            table.column("x").unwrap().values,
            vec![Value::Missing, Value::Float(1.0), Value::Float(-0.0)]
        );
    }

    #[test]
    fn test_fill_with_mean() {
        let mut table = Table::new(vec![Column::new(
            "x",
            ColumnType::Float,
            vec![Value::Float(1.0), Value::Missing, Value::Float(3.0)],
        )])
        .unwrap();

        let report = fill_missing_with_mean(&mut table);

        assert_eq!(
            table.column("x").unwrap().values,
            vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]
        );
        assert_eq!(report.total_filled(), 1);
        assert_eq!(report.columns[0].mean, Some(2.0));
    }

    #[test]
    fn test_fill_all_missing_column_is_noop() {
        let mut table = Table::new(vec![Column::new(
            "x",
            ColumnType::Float,
            vec![Value::Missing, Value::Missing],
        )])
        .unwrap();

        let report = fill_missing_with_mean(&mut table);

        assert_eq!(table.column("x").unwrap().values, vec![Value::Missing, Value::Missing]);
        assert_eq!(report.columns[0].mean, None);
        assert_eq!(report.total_filled(), 0);
    }

    #[test]
    fn test_fill_skips_column_with_nan_mean() {
        let original = vec![Value::Float(f64::INFINITY), Value::Float(f64::NEG_INFINITY), Value::Missing];
        let mut table = Table::new(vec![Column::new("x", ColumnType::Float, original.clone())]).unwrap();

        let report = fill_missing_with_mean(&mut table);

        assert_eq!(table.column("x").unwrap().values, original);
        assert_eq!(report.columns[0].mean, None);
        assert_eq!(report.total_filled(), 0);
    }

    #[test]
    fn test_fill_leaves_text_untouched() {
        let original = Table::new(vec![
            Column::new("name", ColumnType::Text, vec![text("a"), Value::Missing]),
            Column::new("flag", ColumnType::Boolean, vec![Value::Missing, Value::Bool(true)]),
            Column::new("v", ColumnType::Float, vec![Value::Missing, Value::Float(4.0)]),
        ])
        .unwrap();

        let mut table = original.clone();
        fill_missing_with_mean(&mut table);

        assert_eq!(table.column("name"), original.column("name"));
        assert_eq!(table.column("flag"), original.column("flag"));
        assert_eq!(table.column("v").unwrap().values, vec![Value::Float(4.0), Value::Float(4.0)]);
    }

    #[test]
    fn test_fill_after_dedup_uses_remaining_rows() {
        // Duplicate row (10, missing) would pull the mean if counted twice
        let mut table = Table::new(vec![
            Column::new("k", ColumnType::Integer, vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(3)]),
            Column::new(
                "v",
                ColumnType::Float,
                vec![Value::Float(10.0), Value::Float(10.0), Value::Float(40.0), Value::Missing],
            ),
        ])
        .unwrap();

        remove_duplicates(&mut table);
        let report = fill_missing_with_mean(&mut table);

        assert_eq!(report.columns[1].mean, Some(25.0));
        assert_eq!(table.column("v").unwrap().values[2], Value::Float(25.0));
    }
}
