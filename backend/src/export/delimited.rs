//! CSV writer.

use csv::{Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::models::Table;

/// Serialize a table as comma separated text: header row, then one line
/// per row, no index column.
pub fn write_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if table.column_count() > 0 {
        writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|v| v.to_field()))?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnType, Value};
    use crate::parser::parse_csv_str;

    #[test]
    fn test_write_csv() {
        let table = Table::new(vec![
            Column::new("id", ColumnType::Integer, vec![Value::Int(1), Value::Int(2)]),
            Column::new("note", ColumnType::Text, vec![Value::Text("a, b".into()), Value::Missing]),
            Column::new("v", ColumnType::Float, vec![Value::Float(2.0), Value::Float(0.25)]),
            Column::new("ok", ColumnType::Boolean, vec![Value::Bool(true), Value::Missing]),
        ])
        .unwrap();

        let bytes = write_csv(&table).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "id,note,v,ok\n1,\"a, b\",2.0,True\n2,,0.25,\n"
        );
    }

    #[test]
    fn test_write_csv_header_only() {
        let table = Table::new(vec![Column::new("a", ColumnType::Text, vec![])]).unwrap();
        assert_eq!(write_csv(&table).unwrap(), b"a\n".to_vec());
    }

    #[test]
    fn test_large_whole_floats_reload_as_floats() {
        let table = Table::new(vec![Column::new(
            "v",
            ColumnType::Float,
            vec![Value::Float(1e16), Value::Float(3e20)],
        )])
        .unwrap();

        let bytes = write_csv(&table).unwrap();
        let reloaded = parse_csv_str(&String::from_utf8(bytes).unwrap()).unwrap();

        assert_eq!(reloaded.column("v").unwrap().kind, ColumnType::Float);
        assert_eq!(reloaded, table);
    }

    #[test]
    fn test_whitespace_text_survives_round_trip() {
        let original = "name,n\na,1\n ,2\n";
        let table = parse_csv_str(original).unwrap();

        assert_eq!(table.column("name").unwrap().values[1], Value::Text(" ".into()));
        assert_eq!(String::from_utf8(write_csv(&table).unwrap()).unwrap(), original);
    }
}
