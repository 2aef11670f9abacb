//! Column projection.

use crate::error::TableError;
use crate::models::Table;

/// Keep only the named columns.
///
/// The result follows the table's column order, not the order of
/// `selection`, and keeps every row. Naming a column twice is harmless;
/// naming an unknown column is an error.
pub fn project<S: AsRef<str>>(table: &Table, selection: &[S]) -> Result<Table, TableError> {
    if let Some(unknown) = selection
        .iter()
        .map(AsRef::as_ref)
        .find(|name| table.column(name).is_none())
    {
        return Err(TableError::UnknownColumn(unknown.to_string()));
    }

    let columns = table
        .columns()
        .iter()
        .filter(|c| selection.iter().any(|s| s.as_ref() == c.name))
        .cloned()
        .collect();

    Table::with_rows(columns, table.row_count())
}

/// Order a selection the way the table orders its columns.
///
/// Used to normalise a user selection before storing it.
pub fn ordered_selection<S: AsRef<str>>(table: &Table, selection: &[S]) -> Result<Vec<String>, TableError> {
    Ok(project(table, selection)?.column_names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnType, Value};

    fn table() -> Table {
        Table::new(vec![
            Column::new("a", ColumnType::Integer, vec![Value::Int(1), Value::Int(2)]),
            Column::new("b", ColumnType::Text, vec![Value::Text("x".into()), Value::Missing]),
            Column::new("c", ColumnType::Float, vec![Value::Float(0.5), Value::Missing]),
        ])
        .unwrap()
    }

    #[test]
    fn test_project_keeps_table_order() {
        let projected = project(&table(), &["c", "a"]).unwrap();
        assert_eq!(projected.column_names(), vec!["a", "c"]);
        assert_eq!(projected.row_count(), 2);
    }

    #[test]
    fn test_project_all_is_identity() {
        let t = table();
        assert_eq!(project(&t, t.column_names().as_slice()).unwrap(), t);
    }

    #[test]
    fn test_project_idempotent() {
        let t = table();
        let selection = ["b", "c"];
        let once = project(&t, &selection).unwrap();
        let twice = project(&once, &selection).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_project_unknown_column() {
        let err = project(&table(), &["a", "zzz"]).unwrap_err();
        assert_eq!(err, TableError::UnknownColumn("zzz".into()));
    }

    #[test]
    fn test_project_nothing_keeps_rows() {
        let empty: [&str; 0] = [];
        let projected = project(&table(), &empty).unwrap();
        assert_eq!(projected.column_count(), 0);
        assert_eq!(projected.row_count(), 2);
    }

    #[test]
    fn test_ordered_selection() {
        let order = ordered_selection(&table(), &["c", "b", "c"]).unwrap();
        assert_eq!(order, vec!["b", "c"]);
    }
}
