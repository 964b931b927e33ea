use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::NamedTempFile;

use crate::io::lock::{FileLock, LockError};

/// Key holding the serialized task collection
pub const TASKS_KEY: &str = "tasks";
/// Key holding the explicit theme preference (`dark` / `light`)
pub const THEME_KEY: &str = "theme";
/// Key holding a preserved copy of unparseable task data
pub const CORRUPT_TASKS_KEY: &str = "tasks.corrupt";

/// Error type for the persistence adapter
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("refusing to overwrite unreadable '{0}' (it could not be preserved)")]
    Unreadable(String),
}

/// Durable local key-value storage. Pure get/set, no logic.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Copy the stored bytes of `from` to `to` verbatim, whether or not they
    /// decode as text. Returns false when `from` is absent.
    fn copy(&mut self, from: &str, to: &str) -> Result<bool, StoreError>;

    /// Exclusive access for one read-modify-write cycle, released on drop.
    /// Backends without other writers return `None`.
    fn lock(&self) -> Result<Option<FileLock>, StoreError> {
        Ok(None)
    }
}

/// One file per key inside a data directory
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(DirStore {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Write to a temp file in the same directory, then rename over `path`
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let io_err = |e: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(bytes).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write_atomic(&self.key_path(key), value.as_bytes())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    fn copy(&mut self, from: &str, to: &str) -> Result<bool, StoreError> {
        let path = self.key_path(from);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };
        self.write_atomic(&self.key_path(to), &bytes)?;
        Ok(true)
    }

    /// flock on `<dir>/.lock`, shared with every other `tl` process
    fn lock(&self) -> Result<Option<FileLock>, StoreError> {
        Ok(Some(FileLock::acquire_default(&self.dir)?))
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    writes: HashMap<String, usize>,
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// and inspect what a store-owning component wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value (does not count as a write)
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Number of `set` calls made for `key`
    pub fn writes(&self, key: &str) -> usize {
        self.inner.borrow().writes.get(key).copied().unwrap_or(0)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.value(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.values.insert(key.to_string(), value.to_string());
        *inner.writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.borrow_mut().values.remove(key);
        Ok(())
    }

    fn copy(&mut self, from: &str, to: &str) -> Result<bool, StoreError> {
        let Some(value) = self.value(from) else {
            return Ok(false);
        };
        self.inner
            .borrow_mut()
            .values
            .insert(to.to_string(), value);
        Ok(true)
    }
}
