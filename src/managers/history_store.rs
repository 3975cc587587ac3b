//! History Store for qrstudio.
//!
//! Implements `HistoryStoreTrait`: a bounded, most-recent-first log of past
//! generations, persisted as one JSON array under a fixed storage key.
//! Every mutation rewrites the whole log. Unreadable or corrupt storage is
//! treated as an empty log, never as a fatal error.

use std::sync::Arc;

use crate::database::{Database, KeyValueStore};
use crate::types::errors::StorageError;
use crate::types::record::QrRecord;

/// Storage key holding the serialized history log.
pub const HISTORY_STORAGE_KEY: &str = "qrcode_history";

/// Default number of entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Trait defining history operations.
pub trait HistoryStoreTrait {
    fn append(&mut self, record: QrRecord) -> Result<(), StorageError>;
    fn list(&self) -> Vec<QrRecord>;
    fn get(&self, id: &str) -> Option<QrRecord>;
    fn remove(&mut self, id: &str) -> Result<bool, StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
    fn capacity(&self) -> usize;
}

/// History log backed by the key-value storage table.
pub struct HistoryStore {
    db: Arc<Database>,
    capacity: usize,
}

impl HistoryStore {
    /// Creates a store with the default capacity.
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_capacity(db, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(db: Arc<Database>, capacity: usize) -> Self {
        Self { db, capacity }
    }

    /// Reads the persisted log; any read or parse failure yields an empty log.
    fn load(&self) -> Vec<QrRecord> {
        let raw = match self.db.get_item(HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("history unreadable, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<QrRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("history corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    fn persist(&self, records: &[QrRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.db.set_item(HISTORY_STORAGE_KEY, &json)
    }
}

impl HistoryStoreTrait for HistoryStore {
    /// Inserts at the head and drops the oldest entries beyond capacity.
    fn append(&mut self, record: QrRecord) -> Result<(), StorageError> {
        let mut records = self.load();
        records.insert(0, record);
        if records.len() > self.capacity {
            let evicted = records.len() - self.capacity;
            records.truncate(self.capacity);
            log::debug!("history evicted {} oldest entries", evicted);
        }
        self.persist(&records)
    }

    /// Most recent first.
    fn list(&self) -> Vec<QrRecord> {
        self.load()
    }

    fn get(&self, id: &str) -> Option<QrRecord> {
        self.load().into_iter().find(|r| r.id == id)
    }

    /// Removes the entry with `id`. An absent ID is a no-op and returns `false`.
    fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        let mut records = self.load();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.persist(&records)?;
        Ok(true)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.persist(&[])
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
