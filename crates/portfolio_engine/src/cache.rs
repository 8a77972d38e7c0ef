use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use portfolio_core::Record;
use portfolio_logging::{portfolio_debug, portfolio_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory missing or not writable: {0}")]
    CacheDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Client-local string key-value store.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Lives as long as the process, like a browser tab's session storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::CacheDir("memory cache poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `{key}.json` file per entry, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        ensure_cache_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                portfolio_warn!("Failed to read cache entry {:?}: {}", path, err);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let target = self.path_for(key);
        write_atomic(&target, value.as_bytes())
    }
}

/// Create the directory if missing and make sure it accepts new files.
pub fn ensure_cache_dir(dir: &Path) -> Result<(), CacheError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| CacheError::CacheDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(CacheError::CacheDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| CacheError::CacheDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| CacheError::CacheDir(e.to_string()))?;
    Ok(())
}

/// Writes `contents` to a temp file next to `target`, then renames it over `target`.
pub fn write_atomic(target: &Path, contents: &[u8]) -> Result<(), CacheError> {
    let dir = target
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_cache_dir(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| CacheError::Io(e.error))?;
    Ok(())
}

pub fn snapshot_key(collection: &str) -> String {
    format!("{collection}_cache_v1")
}

/// Whole-collection snapshots on top of a `CacheStore`, as JSON arrays.
pub struct SnapshotCache<R> {
    store: Arc<dyn CacheStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SnapshotCache<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> SnapshotCache<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// A snapshot that cannot be parsed counts as absent.
    pub fn read(&self) -> Option<Vec<R>> {
        let key = snapshot_key(R::COLLECTION);
        let raw = self.store.get(&key)?;
        match serde_json::from_str(&raw) {
            Ok(records) => Some(records),
            Err(err) => {
                portfolio_warn!("Discarding unreadable snapshot {}: {}", key, err);
                None
            }
        }
    }

    /// Replaces the stored snapshot wholesale.
    pub fn write(&self, records: &[R]) -> Result<(), CacheError> {
        let key = snapshot_key(R::COLLECTION);
        let text = serde_json::to_string(records)?;
        self.store.set(&key, &text)?;
        portfolio_debug!("Wrote snapshot {} ({} records)", key, records.len());
        Ok(())
    }
}
