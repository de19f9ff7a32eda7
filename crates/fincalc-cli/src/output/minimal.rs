use serde_json::Value;

use super::format_value;

/// Key answer of each calculator, in priority order.
const PRIORITY_KEYS: [&str; 7] = [
    "scheduled_payment",
    "interest_saved",
    "max_home_price",
    "comparison",
    "future_value",
    "nominal_balance_at_retirement",
    "thirty_year_fixed",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            match map.get(key) {
                Some(Value::Object(cmp)) if key == "comparison" => {
                    let cheaper = cmp.get("cheaper").map(format_value).unwrap_or_default();
                    let diff = cmp.get("difference").map(format_value).unwrap_or_default();
                    println!("{} by {}", cheaper, diff);
                    return;
                }
                Some(val) if !val.is_null() => {
                    println!("{}", format_value(val));
                    return;
                }
                _ => {}
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}
