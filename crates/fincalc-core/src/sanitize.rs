//! Numeric coercion at the parameter-construction boundary.
//!
//! Form state arrives as loosely typed JSON: numbers, numeric strings with
//! currency decorations, empty strings, `null`, or missing keys. Every numeric
//! input field deserializes through [`lenient_decimal`] / [`lenient_u32`] so
//! that anything unparseable becomes zero (dates through [`lenient_opt_date`]
//! become `None`), and every input type implements
//! [`Sanitize`] to clamp values into the range the calculators accept.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::FinCalcError;
use crate::types::{Money, Percent};
use crate::FinCalcResult;

/// Upper bound applied to every user-entered percentage.
pub const MAX_PERCENT: Percent = dec!(100);

/// Upper bound on any horizon expressed in years.
pub const MAX_YEARS: u32 = 100;

/// Clamp a parsed input into the range a calculator accepts.
pub trait Sanitize: Sized {
    fn sanitize(self) -> Self;
}

/// Coerce an arbitrary JSON value to a Decimal; anything non-numeric is zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_numeric_text(&n.to_string()),
        Value::String(s) => parse_numeric_text(s),
        Value::Bool(true) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

fn parse_numeric_text(raw: &str) -> Decimal {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | '_' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO)
}

/// Serde adapter: lenient Decimal field.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_decimal).unwrap_or(Decimal::ZERO))
}

/// Serde adapter: lenient optional Decimal. Blank or unparseable input is `None`.
pub fn lenient_opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(coerce_decimal(&v)),
    })
}

/// Serde adapter: optional ISO date (`2025-01-31`). Blank, `null` or
/// unparseable text is `None`; a trailing time part is ignored.
pub fn lenient_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            let day = trimmed.get(..10).unwrap_or(trimmed);
            NaiveDate::from_str(day).ok()
        }
        _ => None,
    })
}

/// Serde adapter: lenient whole-number field. Fractions truncate, negatives become 0.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = value.as_ref().map(coerce_decimal).unwrap_or(Decimal::ZERO);
    Ok(to_u32(parsed))
}

/// Serde adapter: a list of lenient Decimals.
pub fn lenient_decimal_vec<'de, D>(deserializer: D) -> Result<Vec<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().map(coerce_decimal).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(parse_numeric_text)
            .collect(),
        _ => Vec::new(),
    })
}

/// Truncating conversion to u32; negative or oversized values clamp.
pub fn to_u32(value: Decimal) -> u32 {
    if value <= Decimal::ZERO {
        return 0;
    }
    u32::try_from(value.trunc()).unwrap_or(u32::MAX)
}

/// Negative amounts become zero.
pub fn non_negative(value: Money) -> Money {
    value.max(Decimal::ZERO)
}

/// Percentages clamp into `[0, MAX_PERCENT]`.
pub fn percent(value: Percent) -> Percent {
    value.max(Decimal::ZERO).min(MAX_PERCENT)
}

/// Clamp a year count into `[0, MAX_YEARS]`.
pub fn years(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::from(MAX_YEARS))
}

/// Deserialize a calculator input from JSON text.
pub fn from_json<T: DeserializeOwned>(text: &str) -> FinCalcResult<T> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a snake_case choice (`biweekly`, `on-price`) into a closed enum.
pub fn parse_choice<T: DeserializeOwned>(field: &str, raw: &str) -> FinCalcResult<T> {
    let normalized = raw.trim().to_lowercase().replace('-', "_");
    serde_json::from_value(Value::String(normalized)).map_err(|_| FinCalcError::InvalidInput {
        field: field.to_string(),
        reason: format!("unsupported value '{}'", raw),
    })
}
