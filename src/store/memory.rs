//! In-process store.

use super::{PlayerStore, ScanPage, StoreError, Table, DEFAULT_PAGE_LIMIT};
use crate::models::{Player, PlayerUpdate, RawRow};
use std::sync::RwLock;

/// Rows held in memory only; lost when the process exits.
#[derive(Debug)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_limit(DEFAULT_PAGE_LIMIT)
    }

    /// Store returning at most `page_limit` rows per scan page.
    pub fn with_page_limit(page_limit: usize) -> Self {
        Self {
            table: RwLock::new(Table::new(page_limit)),
        }
    }

    /// Seed with raw rows (e.g. legacy data with loosely typed fields).
    pub fn with_rows(rows: Vec<RawRow>, page_limit: usize) -> Self {
        Self {
            table: RwLock::new(Table::from_rows(rows, page_limit)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStore for MemoryStore {
    fn scan_page(&self, start_after: Option<&str>) -> Result<ScanPage, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.scan_page(start_after))
    }

    fn put(&self, player: &Player) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        table.put(player);
        Ok(())
    }

    fn update(&self, id: &str, update: &PlayerUpdate) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        table.update(id, update);
        Ok(())
    }
}
