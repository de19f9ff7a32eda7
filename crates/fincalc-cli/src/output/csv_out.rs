use serde_json::{Map, Value};
use std::io;

use super::{cumulative_rows, format_value, primary_rows};

/// Write the schedule as CSV, or field/value pairs when the result has none.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.as_object().and_then(|m| m.get("result"));
    match result {
        Some(Value::Object(result)) => {
            if let Some((_, rows)) = primary_rows(result) {
                write_rows(&mut wtr, rows);
            } else if let Some(rows) = cumulative_rows(result) {
                write_rows(&mut wtr, &rows);
            } else {
                write_fields(&mut wtr, result);
            }
        }
        _ => match value {
            Value::Object(map) => write_fields(&mut wtr, map),
            other => {
                let _ = wtr.write_record([format_value(other)]);
            }
        },
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_value(val)]);
    }
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);

    for row in rows.iter().filter_map(Value::as_object) {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_value).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&cells);
    }
}
