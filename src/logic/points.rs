//! Points parsing and display formatting.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Parse an arbitrary external value into exact decimal points.
///
/// Strings and numbers are converted exactly; anything else (null, booleans,
/// arrays, objects, non-numeric text) yields zero rather than an error.
pub fn parse_points(value: &Value) -> Decimal {
    match value {
        Value::String(s) => parse_points_str(s),
        Value::Number(n) => parse_points_str(&n.to_string()),
        _ => Decimal::ZERO,
    }
}

/// Parse decimal text, accepting scientific notation. Malformed text yields zero.
pub fn parse_points_str(text: &str) -> Decimal {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

/// True when `points` is a whole number greater than zero.
pub fn is_positive_whole(points: Decimal) -> bool {
    points > Decimal::ZERO && points.fract().is_zero()
}

/// Render points for display: whole numbers without a fractional part,
/// otherwise the shortest form without trailing zeros.
pub fn format_points(points: Decimal) -> String {
    if points.fract().is_zero() {
        points.trunc().normalize().to_string()
    } else {
        points.normalize().to_string()
    }
}
