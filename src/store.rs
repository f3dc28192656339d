//! Durable key-value storage for the visitor's identity
//!
//! Plays the role of browser-local storage: read once at startup, written
//! only when a session starts or is reset.

mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Storage directory error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String key-value storage.
///
/// Multi-key writes and removals are all-or-nothing from the caller's view.
pub trait KeyValueStore: Send + Sync {
    /// Read one key, `None` when absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write every entry together (last write wins)
    fn set_all(&self, entries: &[(&str, &str)]) -> StoreResult<()>;

    /// Remove every key together; missing keys are ignored
    fn remove_all(&self, keys: &[&str]) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> StoreResult<()> {
        (**self).set_all(entries)
    }

    fn remove_all(&self, keys: &[&str]) -> StoreResult<()> {
        (**self).remove_all(keys)
    }
}

/// In-memory store for tests and for embedding without persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set_all(&self, pairs: &[(&str, &str)]) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in pairs {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
