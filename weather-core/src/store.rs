//! Durable key-value storage for small values.
//!
//! `save` always replaces the whole value stored under a key and `load` returns
//! exactly what the last successful `save` wrote.

use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::PathBuf,
};

use crate::error::PersistenceError;

pub trait PersistenceStore: Send + Sync + Debug {
    /// Returns `Ok(None)` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl PersistenceStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.path_for(key)?;

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { key: key.to_string(), source }),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let io_err = |source: io::Error| PersistenceError::Io { key: key.to_string(), source };

        fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Write next to the target, then rename over it.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;

        tracing::debug!(key, path = %path.display(), bytes = bytes.len(), "saved");
        Ok(())
    }
}

/// Process-local store, useful for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.entries.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
