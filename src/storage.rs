//! Key-value persistence for the workspace
//!
//! Values are JSON blobs. `FileStore` keeps one `<key>.json` file per key
//! under a data directory.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CONNECTED_REPOSITORIES_KEY: &str = "connected-repositories";
pub const SETTINGS_KEY: &str = "settings";
pub const NOTIFICATIONS_KEY: &str = "notifications";

/// Minimal string store keyed by name
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved under `key`
    fn load(&self, key: &str) -> Result<Option<String>>;

    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Load and deserialize a JSON value
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.load(key)? else {
        return Ok(None);
    };
    let value =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse stored {key}"))?;
    Ok(Some(value))
}

/// Serialize and save a JSON value
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    store.save(key, &json)
}

/// One JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sanitize_key(key: &str) -> String {
        key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::sanitize_key(key)))
    }

    /// Write to a temp file, then rename over the target
    fn atomic_write(path: &Path, contents: &str) -> Result<()> {
        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        Self::atomic_write(&self.path_for(key), value)
    }
}

/// In-process store, used by tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("settings").unwrap().is_none());
        store.save("settings", "{}").unwrap();
        assert_eq!(store.load("settings").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.save("a/b", "[1]").unwrap();
        assert!(dir.path().join("a_b.json").exists());
        assert!(!dir.path().join("a_b.json.tmp").exists());
    }

    #[test]
    fn test_load_json_reports_corrupt_value() {
        let store = MemoryStore::new();
        store.save(SETTINGS_KEY, "not json").unwrap();
        let result: Result<Option<Vec<u32>>> = load_json(&store, SETTINGS_KEY);
        assert!(result.is_err());
    }
}
