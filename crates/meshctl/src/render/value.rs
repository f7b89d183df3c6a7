//! Display conversions for schema-less response values.
//!
//! Everything here is total: a value of the wrong shape yields `None` (or a
//! fallback rendering) rather than an error, which is the contract the
//! formatters lean on.

use serde_json::Value;

/// Renders a value in its natural text form.
///
/// Integral numbers drop the decimal point, booleans render as
/// `true`/`false`, strings render verbatim, and nested containers fall back
/// to pretty JSON with two-space indentation.
pub(crate) fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(flag) => flag.to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                integer.to_string()
            } else if let Some(integer) = number.as_u64() {
                integer.to_string()
            } else if let Some(float) = number.as_f64() {
                if float.fract() == 0.0 && float.is_finite() {
                    format!("{float:.0}")
                } else {
                    float.to_string()
                }
            } else {
                number.to_string()
            }
        }
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
    }
}

/// Renders a byte counter as an unsigned decimal integer, truncating any
/// fractional part. Non-numeric input yields `None`.
pub(crate) fn format_byte_count(value: &Value) -> Option<String> {
    let count = value.as_f64()?;
    Some(format!("{}", count.max(0.0) as u64))
}

/// Renders a float seconds count as `HH:MM:SS`. Hours grow past two digits
/// rather than wrapping.
pub(crate) fn format_duration(value: &Value) -> Option<String> {
    let seconds = value.as_f64()?;
    let total = seconds.max(0.0) as u64;
    Some(format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    ))
}

/// Computes `floor(100 / capacity * size)` as used for queue fill reporting.
pub(crate) fn fill_percentage(size: f64, capacity: f64) -> u64 {
    if capacity <= 0.0 {
        return 0;
    }
    (100.0 / capacity * size).max(0.0) as u64
}
