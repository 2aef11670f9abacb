//! Minimal xlsx writer.
//!
//! Produces a single-sheet workbook (`Sheet1`): a header row of strings,
//! then numbers as numeric cells, booleans as boolean cells and text as
//! inline strings. Missing cells are left out of the sheet.
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! xl/workbook.xml
//! xl/_rels/workbook.xml.rels
//! xl/worksheets/sheet1.xml
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportError;
use crate::models::{Table, Value};

const SHEET_NAME: &str = "Sheet1";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Serialize a table as an xlsx workbook.
///
/// Fails with [`ExportError::Unrepresentable`] on infinite floats, which
/// a spreadsheet cell cannot hold.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>, ExportError> {
    package(&sheet_xml(table)?)
}

/// Zip a worksheet part together with the fixed workbook parts.
pub(crate) fn package(sheet: &[u8]) -> Result<Vec<u8>, ExportError> {
    let workbook = workbook_xml();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", workbook.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        NS_MAIN, SHEET_NAME
    )
}

fn xml_error(error: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(error.to_string())
}

/// Worksheet XML for the table.
fn sheet_xml(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("worksheet").with_attributes([("xmlns", NS_MAIN)])))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(xml_error)?;

    if table.column_count() > 0 {
        let header: Vec<Value> = table
            .columns()
            .iter()
            .map(|c| Value::Text(c.name.clone()))
            .collect();
        write_row(&mut writer, table, 1, header.iter())?;

        for (index, row) in table.rows().enumerate() {
            write_row(&mut writer, table, index + 2, row.into_iter())?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("sheetData")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("worksheet")))
        .map_err(xml_error)?;

    Ok(writer.into_inner())
}

fn write_row<'v>(
    writer: &mut Writer<Vec<u8>>,
    table: &Table,
    row_number: usize,
    values: impl Iterator<Item = &'v Value>,
) -> Result<(), ExportError> {
    let row_ref = row_number.to_string();
    writer
        .write_event(Event::Start(BytesStart::new("row").with_attributes([("r", row_ref.as_str())])))
        .map_err(xml_error)?;

    for (column_index, value) in values.enumerate() {
        let reference = format!("{}{}", column_letters(column_index), row_number);
        let mut cell = BytesStart::new("c");
        cell.push_attribute(("r", reference.as_str()));

        match value {
            Value::Missing => continue,
            Value::Float(f) if !f.is_finite() => {
                return Err(ExportError::Unrepresentable {
                    column: table
                        .columns()
                        .get(column_index)
                        .map(|c| c.name.clone())
                        .unwrap_or_default(),
                    row: row_number - 1,
                    value: value.to_field(),
                });
            }
            Value::Int(_) | Value::Float(_) => {
                writer.write_event(Event::Start(cell)).map_err(xml_error)?;
                write_text_element(writer, "v", &numeric_text(value))?;
            }
            Value::Bool(b) => {
                cell.push_attribute(("t", "b"));
                writer.write_event(Event::Start(cell)).map_err(xml_error)?;
                write_text_element(writer, "v", if *b { "1" } else { "0" })?;
            }
            Value::Text(s) => {
                cell.push_attribute(("t", "inlineStr"));
                writer.write_event(Event::Start(cell)).map_err(xml_error)?;
                writer
                    .write_event(Event::Start(BytesStart::new("is")))
                    .map_err(xml_error)?;
                let mut text = BytesStart::new("t");
                if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                    text.push_attribute(("xml:space", "preserve"));
                }
                writer.write_event(Event::Start(text)).map_err(xml_error)?;
                writer
                    .write_event(Event::Text(BytesText::new(s)))
                    .map_err(xml_error)?;
                writer.write_event(Event::End(BytesEnd::new("t"))).map_err(xml_error)?;
                writer.write_event(Event::End(BytesEnd::new("is"))).map_err(xml_error)?;
            }
        }

        writer.write_event(Event::End(BytesEnd::new("c"))).map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("row")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(xml_error)?;
    Ok(())
}

/// Number text for a `<v>` element (shortest round-trip form).
fn numeric_text(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{}", f),
        other => other.to_field(),
    }
}

/// Spreadsheet column letters: 0 → A, 25 → Z, 26 → AA.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
