use colored::Colorize;
use serde_json::Value;

/// Pretty-print the result envelope to stdout.
///
/// When stdout is redirected, calculator warnings (a capped schedule, a
/// saturated balance) are echoed to stderr so they still reach the terminal.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", "JSON serialization error:".red(), e),
    }
    if atty::isnt(atty::Stream::Stdout) {
        for warning in envelope_warnings(value) {
            eprintln!("{} {}", "warning:".yellow(), warning);
        }
    }
}

fn envelope_warnings(value: &Value) -> Vec<&str> {
    value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
