//! File-backed store.
//!
//! All rows live in one JSON array on disk. Every write rewrites the file
//! through a temporary sibling and a rename, so a crash leaves either the old
//! or the new contents.

use super::{PlayerStore, ScanPage, StoreError, Table};
use crate::models::{Player, PlayerUpdate, RawRow};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Durable store persisted as a JSON array of rows.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: RwLock<Table>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>, page_limit: usize) -> Result<Self, StoreError> {
        let path = path.into();
        let rows: Vec<RawRow> = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            Vec::new()
        };
        log::info!("Opened player store {:?} with {} row(s)", path, rows.len());
        Ok(Self {
            path,
            table: RwLock::new(Table::from_rows(rows, page_limit)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &Table) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            let rows: Vec<&RawRow> = table.rows().collect();
            serde_json::to_writer_pretty(&mut writer, &rows)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        log::debug!("Wrote player store {:?}", self.path);
        Ok(())
    }
}

impl PlayerStore for FileStore {
    fn scan_page(&self, start_after: Option<&str>) -> Result<ScanPage, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.scan_page(start_after))
    }

    fn put(&self, player: &Player) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = table.clone();
        next.put(player);
        self.persist(&next)?;
        *table = next;
        Ok(())
    }

    fn update(&self, id: &str, update: &PlayerUpdate) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = table.clone();
        next.update(id, update);
        self.persist(&next)?;
        *table = next;
        Ok(())
    }
}
