//! Submitted result rows: the typed boundary between request bodies and the merge engine.

use crate::logic::points::parse_points;
use crate::logic::validate_batch;
use crate::models::error::LeaderboardError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rust_decimal::Decimal;
use serde_json::Value;

/// Place label meaning "no finishing place recorded".
pub const NO_PLACE: &str = "None";

/// One row of a results batch after boundary normalization (not yet validated).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmittedRow {
    /// Trimmed place label; `None` when missing or blank.
    pub place: String,
    /// Trimmed player name, taken from `name` or else `player`.
    pub name: String,
    pub points: Decimal,
}

impl SubmittedRow {
    pub fn new(place: impl Into<String>, name: impl Into<String>, points: Decimal) -> Self {
        Self {
            place: place.into(),
            name: name.into(),
            points,
        }
    }

    /// Normalize one JSON row. Only a non-object row is rejected here.
    pub fn from_value(value: &Value) -> Result<Self, LeaderboardError> {
        let row = value.as_object().ok_or(LeaderboardError::RowNotObject)?;
        let place = row.get("place").map(loose_text).unwrap_or_default();
        let place = match place.trim() {
            "" => NO_PLACE.to_string(),
            p => p.to_string(),
        };
        let name = row
            .get("name")
            .or_else(|| row.get("player"))
            .map(loose_text)
            .unwrap_or_default();
        let points = row.get("points").map(parse_points).unwrap_or_default();
        Ok(Self {
            place,
            name: name.trim().to_string(),
            points,
        })
    }

    /// True when the place is the "nothing recorded" sentinel.
    pub fn has_no_place(&self) -> bool {
        self.place == NO_PLACE
    }
}

/// Decode a request body into submitted rows.
///
/// An empty body counts as `[]`. With `base64` set the body is base64 text wrapping UTF-8 JSON.
/// A body that is not a non-empty JSON array is rejected as an empty batch.
pub fn parse_batch(body: &[u8], base64: bool) -> Result<Vec<SubmittedRow>, LeaderboardError> {
    let decoded;
    let body = if base64 {
        decoded = STANDARD
            .decode(trim_ascii(body))
            .map_err(|_| LeaderboardError::InvalidBody)?;
        decoded.as_slice()
    } else {
        body
    };
    let text = std::str::from_utf8(body).map_err(|_| LeaderboardError::InvalidBody)?;
    let text = if text.trim().is_empty() { "[]" } else { text };
    let value: Value = serde_json::from_str(text).map_err(|_| LeaderboardError::InvalidBody)?;
    let values = match value {
        Value::Array(rows) if !rows.is_empty() => rows,
        _ => return Err(LeaderboardError::EmptyBatch),
    };
    let mut rows = Vec::with_capacity(values.len());
    for value in &values {
        match SubmittedRow::from_value(value) {
            Ok(row) => rows.push(row),
            Err(e) => {
                // Problems in earlier rows are reported first.
                if !rows.is_empty() {
                    validate_batch(&rows)?;
                }
                return Err(e);
            }
        }
    }
    Ok(rows)
}

fn loose_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}
