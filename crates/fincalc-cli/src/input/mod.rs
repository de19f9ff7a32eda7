pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a calculator input from `--input`, else piped stdin.
/// `None` means the caller should build the input from flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Parse a choice flag (`biweekly`, `on-price`) into a core enum.
pub fn parse_choice<T: DeserializeOwned>(flag: &str, raw: &str) -> Result<T, Box<dyn std::error::Error>> {
    Ok(fincalc_core::sanitize::parse_choice(flag, raw)?)
}
