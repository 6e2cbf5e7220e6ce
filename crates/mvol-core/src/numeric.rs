//! Numeric text helpers.
//!
//! Every derived value is rounded half-up to two decimals before it is
//! displayed or persisted, and every persisted value must parse back to the
//! exact same `f64`. These helpers keep both directions in one place.

use crate::error::{CoreError, Result};

/// Round half up to two decimal places.
///
/// `round2(1.005)` follows the binary value of `1.005 * 100`, so callers see the
/// same result as any other `floor(x * 100 + 0.5) / 100` implementation.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Parse a single numeric token.
///
/// Leading and trailing whitespace is ignored. Non-finite values (`NaN`,
/// `inf`) are rejected: they cannot be ranked or rounded meaningfully.
pub fn parse_value(token: &str) -> Result<f64> {
    let token = token.trim();
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoreError::InvalidNumber(token.to_string())),
    }
}

/// Parse a comma-separated series such as `"1.5, 2, 3.25"`.
///
/// Blank input is an empty series. A blank token inside a non-blank input
/// (`"1,,3"`) is an error rather than being silently skipped.
pub fn parse_series(input: &str) -> Result<Vec<f64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    trimmed.split(',').map(parse_value).collect()
}

/// Render a value so that it always carries a decimal point and parses back
/// to the identical `f64` (`5.0`, `0.35`, `-12.5`).
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

/// Render a series in bracketed list form: `[1.0, 2.5, 3.0]`.
pub fn format_series(series: &[f64]) -> String {
    let body: Vec<String> = series.iter().map(|v| format_value(*v)).collect();
    format!("[{}]", body.join(", "))
}
