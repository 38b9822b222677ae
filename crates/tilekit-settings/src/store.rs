//! Key-value persistence for settings that outlive a session.
//!
//! Entries are JSON values kept in a single file. A corrupt or missing entry
//! reads as absent; the caller falls back to its defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tilekit_core::{CropSettings, TileSettings};

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};

/// Key under which the crop and tile settings are stored.
pub const LAYOUT_KEY: &str = "puzzle-engine-state";

const STORE_FILE_NAME: &str = "store.json";

/// Crop and tile settings as persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLayout {
    pub crop_settings: CropSettings,
    pub tile_settings: TileSettings,
}

/// File-backed key-value store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    entries: BTreeMap<String, serde_json::Value>,
}

impl SettingsStore {
    /// Opens the store at `path`. A missing file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable store {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Opens the store in the platform config directory.
    pub fn open_default() -> SettingsResult<Self> {
        Self::open(Config::config_dir()?.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Reads an entry. Entries that do not deserialize as `T` read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Stored value for '{}' is unreadable: {}", key, e);
                None
            }
        }
    }

    /// Writes an entry and flushes the store to disk.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> SettingsResult<()> {
        self.entries
            .insert(key.to_string(), serde_json::to_value(value)?);
        self.flush()
    }

    /// Removes an entry. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> SettingsResult<bool> {
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.flush()?;
        }
        Ok(existed)
    }

    pub fn clear(&mut self) -> SettingsResult<()> {
        self.entries.clear();
        self.flush()
    }

    pub fn save_layout(&mut self, crop: CropSettings, tiles: TileSettings) -> SettingsResult<()> {
        self.set(
            LAYOUT_KEY,
            &StoredLayout {
                crop_settings: crop,
                tile_settings: tiles,
            },
        )
    }

    pub fn load_layout(&self) -> Option<StoredLayout> {
        self.get(LAYOUT_KEY)
    }

    fn flush(&self) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}
