use std::fs::File;
use std::path::Path;

use serde_json::Value;

/// Write a result table (an array of row objects) as a CSV file.
///
/// Headers come from the first row's keys; rows preserve the table's
/// serialization order.
pub fn write_csv(path: &Path, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    if let Value::Array(rows) = value {
        write_array_csv(&mut wtr, rows)?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_array_csv(
    wtr: &mut csv::Writer<File>,
    rows: &[Value],
) -> Result<(), Box<dyn std::error::Error>> {
    if rows.is_empty() {
        return Ok(());
    }

    // Extract headers from the first row
    if let Some(Value::Object(first)) = rows.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        wtr.write_record(&headers)?;

        for row in rows {
            if let Value::Object(map) = row {
                let record: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                wtr.write_record(&record)?;
            }
        }
    }

    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
