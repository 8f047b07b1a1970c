//! Key-value persistence that survives restarts.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONTENT_KEY: &str = "markdown-content";
pub const FILENAME_KEY: &str = "markdown-filename";
pub const THEME_KEY: &str = "markdown-theme";

/// Synchronous string store.
pub trait Storage {
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Process-lifetime store, used in tests and headless runs.
///
/// Clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryEntries>>,
}

#[derive(Debug, Default)]
struct MemoryEntries {
    entries: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.borrow().entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// JSON file store. Every `set` rewrites the file through a temporary
/// sibling and a rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    file: StorageFile,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse storage {}", path.display()))?
        } else {
            StorageFile::default()
        };
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.file).context("Failed to encode storage")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace storage {}", self.path.display()))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.file.entries.insert(key.to_string(), value.to_string());
        self.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage_get_set() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get(CONTENT_KEY).unwrap(), None);
        storage.set(CONTENT_KEY, "# hi").unwrap();
        assert_eq!(storage.get(CONTENT_KEY).unwrap().as_deref(), Some("# hi"));
        assert_eq!(storage.writes(), 1);
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let mut handle = storage.clone();
        handle.set(THEME_KEY, "dark").unwrap();
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        {
            let mut storage = FileStorage::open(&path).unwrap();
            storage.set(CONTENT_KEY, "line one\nline two\n").unwrap();
            storage.set(THEME_KEY, "dark").unwrap();
        }
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get(CONTENT_KEY).unwrap().as_deref(),
            Some("line one\nline two\n")
        );
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(reopened.get(FILENAME_KEY).unwrap(), None);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(storage.get(CONTENT_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();
        let err = FileStorage::open(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse storage"));
    }
}
