//! Durable key-value storage for persisted content.
//!
//! [`PersistentStore`] wraps a [`KeyValueBackend`] with JSON encoding and the
//! recovery rules of the site: a missing or unreadable value falls back to the
//! caller's default, and a failed write only produces a warning because the
//! in-memory state stays authoritative for the running session.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::constants::{BANNER_KEY, TICKER_KEY};
use crate::models::PersistedContent;

/// String key-value storage (the durable client storage collaborator).
pub trait KeyValueBackend: Send + Sync {
    /// Reads the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process backend, optionally limited to a byte quota.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    /// Creates an unbounded backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes once stored values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Storage lock poisoned"))
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries()?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                anyhow::bail!(
                    "Storage quota exceeded: writing '{}' needs {} bytes, {} of {} available",
                    key,
                    value.len(),
                    quota.saturating_sub(others),
                    quota
                );
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Backend storing one `<key>.json` file per key inside a directory.
///
/// Writes use the temp file + rename pattern so a value is never left
/// half-written.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileBackend {
    /// Creates a backend rooted at `dir` (created lazily on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes: None,
        }
    }

    /// Limits the total size of stored values; `0` disables the limit.
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = (quota_bytes > 0).then_some(quota_bytes);
        self
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn used_bytes_excluding(&self, excluded: &Path) -> Result<u64> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.dir).context(format!(
            "Failed to read storage directory: {}",
            self.dir.display()
        ))?;

        let mut total = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path == excluded || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                total += metadata.len();
            }
        }
        Ok(total)
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .context(format!("Failed to read stored value: {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if let Some(quota) = self.quota_bytes {
            let others = self.used_bytes_excluding(&path)?;
            let needed = value.len() as u64;
            if others + needed > quota {
                anyhow::bail!(
                    "Storage quota exceeded: writing '{}' needs {} bytes, {} of {} available",
                    key,
                    needed,
                    quota.saturating_sub(others),
                    quota
                );
            }
        }

        fs::create_dir_all(&self.dir).context(format!(
            "Failed to create storage directory: {}",
            self.dir.display()
        ))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).context(format!(
            "Failed to write temp storage file: {}",
            temp_path.display()
        ))?;
        fs::rename(&temp_path, &path).context(format!(
            "Failed to rename temp storage file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .context(format!("Failed to remove stored value: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Keys become file names, so only a conservative character set is accepted.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        anyhow::bail!("Storage key cannot be empty");
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        anyhow::bail!("Storage key '{key}' may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// JSON value store with default fallback and corruption recovery.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl PersistentStore {
    /// Wraps a backend.
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Store backed by a [`FileBackend`] in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self::new(Arc::new(FileBackend::new(dir).with_quota(quota_bytes)))
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Reads the value under `key`, returning `default` when it is missing or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored value for '{}', using default", key);
                return default;
            }
            Err(e) => {
                warn!("Error reading stored value for '{}': {:#}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Stored value for '{}' is not valid JSON, using default: {}",
                    key, e
                );
                default
            }
        }
    }

    /// Writes `value` under `key`; failures are logged and swallowed.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            warn!("Could not persist '{}': {:#}", key, e);
        }
    }

    /// Writes `value` under `key`, reporting failures to the caller.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize value for '{key}'"))?;
        self.backend
            .set(key, &json)
            .with_context(|| format!("Failed to persist '{key}'"))
    }

    /// Removes `key` so later loads fall back to defaults.
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!("Could not clear '{}': {:#}", key, e);
        }
    }

    /// Loads ticker lines and banner images, each falling back to its default.
    pub fn load_content(&self) -> PersistedContent {
        let defaults = PersistedContent::defaults();
        PersistedContent {
            ticker_lines: self.load(TICKER_KEY, defaults.ticker_lines),
            banner_images: self.load(BANNER_KEY, defaults.banner_images),
        }
    }

    /// Persists both content keys.
    ///
    /// The two keys are written one after the other; if the banner write
    /// fails the previous ticker value is put back, so a failed save leaves
    /// the store as it was.
    pub fn try_save_content(&self, content: &PersistedContent) -> Result<()> {
        let previous_ticker = self
            .backend
            .get(TICKER_KEY)
            .with_context(|| format!("Failed to read '{TICKER_KEY}' before saving"))?;

        self.try_save(TICKER_KEY, &content.ticker_lines)?;

        if let Err(e) = self.try_save(BANNER_KEY, &content.banner_images) {
            let restored = match &previous_ticker {
                Some(raw) => self.backend.set(TICKER_KEY, raw),
                None => self.backend.remove(TICKER_KEY),
            };
            if let Err(restore_err) = restored {
                warn!(
                    "Could not restore '{}' after a failed save: {:#}",
                    TICKER_KEY, restore_err
                );
            }
            return Err(e);
        }

        Ok(())
    }

    /// Removes both content keys.
    pub fn clear_content(&self) {
        self.clear(TICKER_KEY);
        self.clear(BANNER_KEY);
    }
}
