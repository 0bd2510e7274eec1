// src/store/file.rs

//! JSON-file-backed store used by the CLI.
//!
//! The whole map lives in one pretty-printed JSON object. Every write is
//! flushed to disk immediately, so a later process ("reload") sees it.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::store::KeyValueStore;
use crate::util::{ensure_dir, read_to_string};

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Rc<Inner>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store; the file is created on first write.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let raw = read_to_string(path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)
                    .with_context(|| format!("Store file is not a JSON object: {:?}", path))?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened store");

        Ok(Self {
            inner: Rc::new(Inner {
                path: path.to_path_buf(),
                entries: RefCell::new(entries),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(&*self.inner.entries.borrow())
            .context("Failed to serialise store")?;

        std::fs::write(&self.inner.path, bytes)
            .with_context(|| format!("Failed to write store file {:?}", self.inner.path))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.inner.entries.borrow_mut().remove(key);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set("code_p1", "def solve(x):\n    return x\n").unwrap();
        store.set("sidebar_collapsed", "true").unwrap();
        store.remove("sidebar_collapsed").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("code_p1").as_deref(),
            Some("def solve(x):\n    return x\n")
        );
        assert!(reopened.get("sidebar_collapsed").is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("absent.json")).unwrap();
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2").unwrap();

        assert!(FileStore::open(&path).is_err());
    }
}
