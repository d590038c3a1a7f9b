//! Storage layer for taskdeck
//!
//! A key/value store holds each collection as one serialized JSON array,
//! written and read as a whole:
//!
//! ```text
//! <store dir>/                  # FileStore layout
//!   tasks.json                  # every Task record
//!   tasks.json.lock             # writer lock
//!   projects.json               # every Project record
//!   projects.json.lock
//! ```
//!
//! [`Storage`] pairs a backend with the [`ChangeBus`] so that every
//! successful collection write notifies all subscribers.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::events::ChangeBus;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Key of the Task collection
pub const TASKS_KEY: &str = "tasks";

/// Key of the Project collection
pub const PROJECTS_KEY: &str = "projects";

/// Extension of collection files in a [`FileStore`]
pub const COLLECTION_EXT: &str = "json";

/// Synchronous key/value persistence.
///
/// A missing key is `Ok(None)`, never an error.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

// =============================================================================
// File-backed store
// =============================================================================

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{COLLECTION_EXT}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _lock = FileLock::acquire(lock::lock_path_for(&path), self.lock_timeout_ms)?;
        match fs::remove_file(&path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(Error::Io(err)),
            _ => Ok(()),
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("store key cannot be empty".to_string()));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(Error::InvalidArgument(format!(
            "store key '{key}' may only contain [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

// =============================================================================
// Collection-level access
// =============================================================================

/// Store backend plus the bus its writes are announced on.
///
/// Clones share both, so every repository built from clones of one
/// `Storage` sees the others' writes as notifications.
#[derive(Debug, Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self::with_bus(backend, ChangeBus::new())
    }

    pub fn with_bus(backend: impl KeyValueStore + 'static, bus: ChangeBus) -> Self {
        Self {
            backend: Arc::new(backend),
            bus,
        }
    }

    /// Storage over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Read a whole collection.
    ///
    /// Absent, unreadable, or undecodable data all yield an empty collection;
    /// the cause is logged and never surfaced.
    pub fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::error!(key, error = %err, "store read failed; treating collection as empty");
                return Vec::new();
            }
        };

        match decode_collection(key, &raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding corrupt collection");
                Vec::new()
            }
        }
    }

    /// Overwrite a whole collection, then notify subscribers.
    pub fn write_collection<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        self.backend.set(key, &json)?;
        tracing::debug!(key, records = records.len(), "collection persisted");
        self.bus.publish();
        Ok(())
    }
}

/// Decode a stored collection. Blank text and JSON `null` are empty.
pub fn decode_collection<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Vec<T>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Option<Vec<T>> =
        serde_json::from_str(raw).map_err(|err| Error::StorageCorrupt {
            key: key.to_string(),
            message: err.to_string(),
        })?;
    Ok(records.unwrap_or_default())
}
