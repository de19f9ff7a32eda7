pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Row-shaped arrays in a result, in the order they are worth showing.
const ROW_FIELDS: [&str; 3] = ["schedule", "year_by_year", "yearly"];

/// The first array of objects in a result object, with its field name.
pub(crate) fn primary_rows(result: &Map<String, Value>) -> Option<(&str, &Vec<Value>)> {
    ROW_FIELDS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(rows)) if rows.first().is_some_and(Value::is_object) => {
            Some((*key, rows))
        }
        _ => None,
    })
}

/// Lease-vs-buy results carry parallel monthly series; zip them into rows.
pub(crate) fn cumulative_rows(result: &Map<String, Value>) -> Option<Vec<Value>> {
    let lease = result.get("lease_cumulative")?.as_array()?;
    let buy = result.get("buy_cumulative")?.as_array()?;
    let book = result
        .get("depreciation_curve")
        .and_then(|c| c.get("values"))
        .and_then(Value::as_array);
    Some(
        lease
            .iter()
            .zip(buy.iter())
            .enumerate()
            .map(|(month, (l, b))| {
                let value = book.and_then(|v| v.get(month)).cloned().unwrap_or(Value::Null);
                serde_json::json!({ "month": month, "lease": l, "buy": b, "book_value": value })
            })
            .collect(),
    )
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
