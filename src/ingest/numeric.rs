/// Numeric decoding shared by every response parser.
///
/// Upstream water levels are whole centimeters, but the ArcGIS service types
/// its value column loosely and may hand back `87.0` or `"87"`. Integers are
/// taken exactly; anything fractional is rounded half away from zero.

use crate::model::FetchError;
use serde_json::Value;

/// Parses a numeric literal (optionally signed, optionally decimal).
pub fn parse_centimeters(text: &str) -> Result<i64, FetchError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FetchError::parse("empty numeric literal"));
    }

    if let Ok(whole) = trimmed.parse::<i64>() {
        return Ok(whole);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| FetchError::parse(format!("'{}' is not a number", trimmed)))?;
    round_centimeters(value)
}

/// Rounds a float reading to whole centimeters.
pub fn round_centimeters(value: f64) -> Result<i64, FetchError> {
    if !value.is_finite() || value.abs() > i64::MAX as f64 {
        return Err(FetchError::parse(format!("{} is not a usable water level", value)));
    }
    Ok(value.round() as i64)
}

/// Decodes a JSON attribute value into centimeters.
///
/// `null`, booleans, arrays and objects are parse failures.
pub fn centimeters_from_json(value: &Value) -> Result<i64, FetchError> {
    match value {
        Value::Number(n) => {
            if let Some(whole) = n.as_i64() {
                Ok(whole)
            } else {
                let float = n
                    .as_f64()
                    .ok_or_else(|| FetchError::parse(format!("{} is out of range", n)))?;
                round_centimeters(float)
            }
        }
        Value::String(s) => parse_centimeters(s),
        Value::Null => Err(FetchError::parse("water level is null")),
        other => Err(FetchError::parse(format!(
            "expected a number for the water level, got {}",
            other
        ))),
    }
}
