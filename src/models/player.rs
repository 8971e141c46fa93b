//! Player records and their raw store representation.

use crate::logic::points::{format_points, parse_points};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for a player, the sole update key in the store.
pub type PlayerId = String;

/// One stored row exactly as the store holds it. Values are loosely typed
/// because rows may have been written by older versions or by hand.
pub type RawRow = Map<String, Value>;

/// A player with cumulative points across the series.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub points: Decimal,
    /// Comma-separated finishing places, oldest first.
    pub results: String,
    /// ISO-8601 UTC timestamp of the last change (may be empty on legacy rows).
    pub updated: String,
}

/// Fields written when an existing player is updated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayerUpdate {
    pub points: Decimal,
    pub results: String,
    pub updated: String,
}

impl Player {
    /// Create a new player with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        points: Decimal,
        results: impl Into<String>,
        updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            points,
            results: results.into(),
            updated: timestamp(updated),
        }
    }

    /// Read a player from a raw row. Missing fields become empty text, bad points become zero.
    pub fn from_raw(row: &RawRow) -> Self {
        Self {
            id: text_field(row, "id"),
            name: text_field(row, "name"),
            points: row.get("points").map(parse_points).unwrap_or_default(),
            results: text_field(row, "results"),
            updated: text_field(row, "updated"),
        }
    }

    /// Raw row for a create.
    pub fn to_raw(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert("id".into(), Value::String(self.id.clone()));
        row.insert("name".into(), Value::String(self.name.clone()));
        row.insert("points".into(), Value::String(format_points(self.points)));
        row.insert("results".into(), Value::String(self.results.clone()));
        row.insert("updated".into(), Value::String(self.updated.clone()));
        row
    }

    /// Apply an update to this in-memory copy.
    pub fn apply(&mut self, update: &PlayerUpdate) {
        self.points = update.points;
        self.results = update.results.clone();
        self.updated = update.updated.clone();
    }

    /// Parsed `updated`, if it holds a recognizable ISO-8601 timestamp.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated)
    }
}

impl PlayerUpdate {
    /// Store fields touched by an update, keyed as in the raw row.
    pub fn to_raw(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert("points".into(), Value::String(format_points(self.points)));
        row.insert("results".into(), Value::String(self.results.clone()));
        row.insert("updated".into(), Value::String(self.updated.clone()));
        row
    }
}

/// Second-precision UTC timestamp, e.g. `2026-01-31T20:15:00Z`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an ISO-8601 timestamp; `Z`, explicit offsets and naive (assumed UTC) forms are accepted.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| chrono::NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn text_field(row: &RawRow, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
