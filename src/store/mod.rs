#![forbid(unsafe_code)]

//! Key/value persistence for whole JSON documents.
//!
//! Every document is read and written as a unit; there is no partial update
//! and the last write wins.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::WeekboardError;

pub const BOARD_KEY: &str = "kanbanBoard";
pub const TASK_TYPES_KEY: &str = "taskTypes";
const COMMENTS_KEY_PREFIX: &str = "task-comments-";

#[must_use]
pub fn comments_key(task_id: &str) -> String {
    format!("{COMMENTS_KEY_PREFIX}{task_id}")
}

pub trait Storage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

impl<T: Storage + ?Sized> Storage for &T {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        (**self).remove(key)
    }
}

/// Outcome of decoding a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Missing,
    Malformed,
    Value(T),
}

/// Reads and decodes `key`. Unparseable content is logged and reported as
/// [`Loaded::Malformed`] so callers can keep their defaults.
pub fn load_json<T: DeserializeOwned>(store: &impl Storage, key: &str) -> anyhow::Result<Loaded<T>> {
    let Some(raw) = store.read(key)? else {
        return Ok(Loaded::Missing);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Loaded::Value(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed stored document");
            Ok(Loaded::Malformed)
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &impl Storage,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    let data = serde_json::to_string(value)?;
    store.write(key, &data)?;
    tracing::debug!(key, bytes = data.len(), "persisted document");
    Ok(())
}

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create data dir {}", self.dir.display()))
    }

    fn key_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(data))
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.ensure_dir()?;
        let path = self.key_path(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value.as_bytes())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to rename {} -> {}", tmp.display(), path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(());
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove {}", path.display()))
    }
}

/// In-process store; nothing survives the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.docs.borrow().keys().cloned().collect()
    }
}

impl Storage for MemoryStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        validate_key(key)?;
        Ok(self.docs.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        validate_key(key)?;
        self.docs
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        validate_key(key)?;
        self.docs.borrow_mut().remove(key);
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), WeekboardError> {
    let invalid = |msg: &str| WeekboardError::InvalidKey {
        key: key.to_owned(),
        msg: msg.to_owned(),
    };
    if key.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if key.contains('/') || key.contains('\\') {
        return Err(invalid("must not contain path separators"));
    }
    if key.contains("..") {
        return Err(invalid("must not contain '..'"));
    }
    Ok(())
}
