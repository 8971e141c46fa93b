//! Key-value store for player rows.
//!
//! The store is the source of truth. It hands out raw rows page by page and
//! writes one row at a time by id:
//! - `MemoryStore` keeps rows in process (tests, throwaway runs)
//! - `FileStore` persists rows to a JSON file after every write

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::{Player, PlayerId, PlayerUpdate, RawRow};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A lock was poisoned by a panicking writer.
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Json(e) => write!(f, "JSON error: {}", e),
            StoreError::Poisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
            StoreError::Poisoned => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// One page of a scan.
#[derive(Clone, Debug, Default)]
pub struct ScanPage {
    pub rows: Vec<RawRow>,
    /// Id of the last row returned when more rows may follow; `None` on the final page.
    pub last_key: Option<PlayerId>,
}

/// Storage backend for player rows.
pub trait PlayerStore: Send + Sync {
    /// Return up to the store's page limit of rows whose id sorts after `start_after`.
    fn scan_page(&self, start_after: Option<&str>) -> Result<ScanPage, StoreError>;

    /// Create (or overwrite) a full row.
    fn put(&self, player: &Player) -> Result<(), StoreError>;

    /// Set the update fields on the row with `id`, creating it if absent.
    fn update(&self, id: &str, update: &PlayerUpdate) -> Result<(), StoreError>;

    /// Every row in the store, following continuation keys across pages.
    fn scan_all(&self) -> Result<Vec<RawRow>, StoreError> {
        let mut rows = Vec::new();
        let mut page = self.scan_page(None)?;
        rows.append(&mut page.rows);
        while let Some(last_key) = page.last_key.take() {
            page = self.scan_page(Some(&last_key))?;
            rows.append(&mut page.rows);
        }
        log::info!("Scanned player store and loaded {} row(s).", rows.len());
        Ok(rows)
    }

    /// Every row read leniently as a player.
    fn load_players(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.scan_all()?.iter().map(Player::from_raw).collect())
    }
}

/// Rows ordered by id, shared by the in-process and file-backed stores.
#[derive(Clone, Debug)]
pub(crate) struct Table {
    rows: BTreeMap<PlayerId, RawRow>,
    page_limit: usize,
}

impl Table {
    pub(crate) fn new(page_limit: usize) -> Self {
        Self {
            rows: BTreeMap::new(),
            page_limit: page_limit.max(1),
        }
    }

    /// Build from stored rows. A row whose id is missing, not text, or already
    /// taken is keyed under a fresh id, written back into its `id` field so
    /// later updates reach it. Every row is kept.
    pub(crate) fn from_rows(rows: Vec<RawRow>, page_limit: usize) -> Self {
        let mut table = Self::new(page_limit);
        let mut retyped = Vec::new();
        for row in rows {
            let key = match row.get("id") {
                Some(Value::String(s)) if !s.is_empty() && !table.rows.contains_key(s) => Some(s.clone()),
                _ => None,
            };
            match key {
                Some(key) => {
                    table.rows.insert(key, row);
                }
                None => retyped.push(row),
            }
        }
        for mut row in retyped {
            let id = match row.get("id") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            let id = if id.is_empty() || table.rows.contains_key(&id) {
                Uuid::new_v4().to_string()
            } else {
                id
            };
            log::warn!("Stored row keyed under id '{}' (original id {:?})", id, row.get("id"));
            row.insert("id".into(), Value::String(id.clone()));
            table.rows.insert(id, row);
        }
        table
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &RawRow> {
        self.rows.values()
    }

    pub(crate) fn scan_page(&self, start_after: Option<&str>) -> ScanPage {
        use std::ops::Bound;
        let lower = match start_after {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };
        let mut iter = self.rows.range((lower, Bound::Unbounded));
        let mut page = ScanPage::default();
        let mut last = None;
        for (id, row) in iter.by_ref().take(self.page_limit) {
            page.rows.push(row.clone());
            last = Some(id.clone());
        }
        if iter.next().is_some() {
            page.last_key = last;
        }
        page
    }

    pub(crate) fn put(&mut self, player: &Player) {
        self.rows.insert(player.id.clone(), player.to_raw());
    }

    pub(crate) fn update(&mut self, id: &str, update: &PlayerUpdate) {
        let row = self.rows.entry(id.to_string()).or_insert_with(|| {
            let mut row = RawRow::new();
            row.insert("id".into(), Value::String(id.to_string()));
            row
        });
        row.extend(update.to_raw());
    }
}
