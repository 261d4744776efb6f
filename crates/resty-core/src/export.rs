use std::io;

use serde_json::Value;

use crate::error::Error;

/// Column used for records that are not JSON objects.
const SCALAR_COLUMN: &str = "value";

/// Flatten one record into `(column, cell)` pairs. Nested objects become
/// dotted columns (`attributes.type`); arrays are kept as JSON text.
pub fn flatten_record(record: &Value) -> Vec<(String, String)> {
    let mut row = Vec::new();
    flatten_into("", record, &mut row);
    row
}

fn flatten_into(prefix: &str, value: &Value, row: &mut Vec<(String, String)>) {
    match value {
        Value::Object(object) if !object.is_empty() => {
            for (key, nested) in object {
                let column = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&column, nested, row);
            }
        }
        Value::Object(_) if prefix.is_empty() => {}
        _ => {
            let column = if prefix.is_empty() { SCALAR_COLUMN } else { prefix };
            row.push((column.to_string(), cell(value)));
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Write records as CSV with a header row. Columns appear in first-seen order
/// and a record without a column gets an empty cell.
pub fn write_csv<W: io::Write>(records: &[Value], output: W) -> Result<(), Error> {
    let rows: Vec<_> = records.iter().map(flatten_record).collect();
    let mut columns: Vec<&str> = Vec::new();
    for (column, _) in rows.iter().flatten() {
        if !columns.contains(&column.as_str()) {
            columns.push(column);
        }
    }
    let mut writer = csv::Writer::from_writer(output);
    if !columns.is_empty() {
        writer.write_record(&columns)?;
        for row in &rows {
            writer.write_record(columns.iter().map(|column| {
                row.iter()
                    .find(|(name, _)| name.as_str() == *column)
                    .map_or("", |(_, value)| value.as_str())
            }))?;
        }
    }
    writer.flush()?;
    Ok(())
}
