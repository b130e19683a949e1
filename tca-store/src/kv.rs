//! Key-value storage backends
//!
//! The catalog persists each collection as one JSON string under a fixed
//! key. Backends only need `get` and `set`; both are synchronous and cheap
//! relative to the simulated latency the catalog adds on top.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by a key-value backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be read or written
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing data could not be encoded
    #[error("store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A previous writer panicked while holding the lock
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for tca_common::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => tca_common::Error::Io(e),
            other => tca_common::Error::StoreUnavailable(other.to_string()),
        }
    }
}

/// String-keyed storage holding serialized collections
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` when the key was never set
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Volatile store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable store keeping every key in one JSON object file
///
/// The whole file is rewritten on each `set` through a temporary sibling
/// and a rename, so readers never observe a half-written file. A file that
/// does not parse is moved aside to `<name>.corrupt` and the store starts
/// empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store file at `path`, creating nothing until the first write
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => {
                    debug!(path = %path.display(), keys = entries.len(), "Opened store file");
                    entries
                }
                Err(e) => {
                    let backup = corrupt_path(&path);
                    warn!(
                        path = %path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "Store file is not valid JSON, moving it aside"
                    );
                    std::fs::rename(&path, &backup)?;
                    BTreeMap::new()
                }
            }
        } else {
            info!(path = %path.display(), "Store file not found, starting empty");
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = temp_path(&self.path);
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.write_file(&updated)?;
        *entries = updated;
        debug!(key, bytes = value.len(), "Persisted store key");
        Ok(())
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, ".tmp")
}

fn corrupt_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, ".corrupt")
}
