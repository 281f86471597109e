use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Viewer-local string storage, the degraded-mode stand-in for the remote store
pub trait KeyValueStore: Send + Sync {
    fn load_raw(&self, key: &str) -> Result<Option<String>>;
    fn save_raw(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed JSON helpers over any `KeyValueStore`
pub trait JsonStore: KeyValueStore {
    fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let json = serde_json::to_string(data).context("Failed to serialize data")?;
        self.save_raw(key, &json)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(json) = self.load_raw(key)? else {
            return Ok(None);
        };
        let data = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse stored JSON for key {}. First 200 chars: {}",
                key,
                json.chars().take(200).collect::<String>()))?;
        Ok(Some(data))
    }
}

impl<S: KeyValueStore + ?Sized> JsonStore for S {}

/// One JSON file per key inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create local store directory")?;
        Ok(Self { dir })
    }

    fn build_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

impl KeyValueStore for FileStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        let path = self.build_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read local store file {}", path.display()))?;
        Ok(Some(json))
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<()> {
        let path = self.build_path(key);
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, value).context("Failed to write local store file")?;
        fs::rename(&temp, &path).context("Failed to replace local store file")?;
        debug!("Saved local key {} to {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.build_path(key);
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove local store file")?;
        }
        Ok(())
    }
}

/// In-process store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
