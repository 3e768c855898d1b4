//! UI preferences that live outside the trip database. One flag today
//! (dark theme); the store is keyed so the next flag costs a constant.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::warn;

use crate::db;

pub const DARK_THEME_KEY: &str = "dark_theme";

const SETTINGS_FILE: &str = "settings.json";

trait PrefStore: Send + Sync {
    fn get(&self, key: &str) -> Option<bool>;
    fn set(&self, key: &str, value: bool);
    fn save(&self) -> anyhow::Result<()>;
}

/// Flat JSON file of key/flag pairs. An unreadable or malformed file
/// starts the map empty; every flag then reads as its default.
struct JsonFileStore {
    path: PathBuf,
    data: Mutex<HashMap<String, bool>>,
}

impl JsonFileStore {
    fn open(path: PathBuf) -> Self {
        let data = std::fs::read(&path)
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            data: Mutex::new(data),
        }
    }
}

impl PrefStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<bool> {
        self.data
            .lock()
            .map(|guard| guard.get(key).copied())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: bool) {
        if let Ok(mut guard) = self.data.lock() {
            guard.insert(key.to_string(), value);
        }
    }

    fn save(&self) -> anyhow::Result<()> {
        let snapshot = self
            .data
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings directory {}", parent.display()))?;
        }
        let raw = serde_json::to_vec_pretty(&snapshot).context("serialize settings")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("write settings file {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    data: Mutex<HashMap<String, bool>>,
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Option<bool> {
        self.data
            .lock()
            .map(|guard| guard.get(key).copied())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: bool) {
        if let Ok(mut guard) = self.data.lock() {
            guard.insert(key.to_string(), value);
        }
    }

    fn save(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Cheap-to-clone handle over the preference store.
#[derive(Clone)]
pub struct SettingsHandle {
    inner: Arc<dyn PrefStore>,
}

impl SettingsHandle {
    /// File-backed store at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(JsonFileStore::open(path.into())),
        }
    }

    /// File-backed store in the app's data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::open(db::data_dir()?.join(SETTINGS_FILE)))
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(MemoryStore::default()),
        }
    }

    /// Light theme until the preference is first written.
    pub fn dark_theme(&self) -> bool {
        self.inner.get(DARK_THEME_KEY).unwrap_or(false)
    }

    /// Updates the flag and persists. A failed write keeps the in-memory
    /// value; the next save retries the file.
    pub fn set_dark_theme(&self, enabled: bool) {
        self.inner.set(DARK_THEME_KEY, enabled);
        if let Err(err) = self.inner.save() {
            warn!(
                target: "triplog",
                event = "settings_save_failed",
                error = %err
            );
        }
    }
}
