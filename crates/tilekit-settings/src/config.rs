//! Configuration for the assembly engine and viewport.
//!
//! Supports JSON and TOML files (chosen by extension) stored in the
//! platform configuration directory. Sections missing from a file fall back
//! to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tilekit_core::{
    CropSettings, PuzzleError, SnapConfig, TileSettings, ViewportLimits,
};

use crate::error::{SettingsError, SettingsResult};

const CONFIG_DIR_NAME: &str = "tilekit";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Undo/redo settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept on the undo stack.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: tilekit_core::constants::DEFAULT_HISTORY_DEPTH,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub snap: SnapConfig,
    pub viewport: ViewportLimits,
    pub history: HistoryConfig,
    /// Last crop region used.
    pub crop: CropSettings,
    /// Last tile size used.
    pub tiles: TileSettings,
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config directory for Tilekit, e.g. `~/.config/tilekit`.
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    pub fn default_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file at `path` if it exists, otherwise returns defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML). Parent directories are created.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        self.snap.validate()?;
        self.viewport.validate()?;

        if self.history.max_depth == 0 {
            return Err(PuzzleError::out_of_range("history.max_depth", 0).into());
        }
        if !(self.crop.width > 0.0 && self.crop.height > 0.0) {
            return Err(PuzzleError::out_of_range(
                "crop",
                format!("{}x{}", self.crop.width, self.crop.height),
            )
            .into());
        }
        if !(self.tiles.width > 0.0 && self.tiles.height > 0.0) {
            return Err(PuzzleError::out_of_range(
                "tiles",
                format!("{}x{}", self.tiles.width, self.tiles.height),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert!(config.snap.enable_snapping);
        assert_eq!(config.snap.grid_size, 10.0);
        assert_eq!(config.snap.snap_threshold, 20.0);
        assert_eq!(config.viewport.min_scale, 0.1);
        assert_eq!(config.viewport.max_scale, 5.0);
        assert_eq!(config.history.max_depth, 50);
        assert_eq!(config.tiles, TileSettings::new(100.0, 100.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.history.max_depth = 0;
        assert!(matches!(config.validate(), Err(SettingsError::Invalid(_))));

        let mut config = Config::default();
        config.tiles.width = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.crop.height = -5.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.viewport.min_scale = 6.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[snap]\ngrid_size = 25.0\n").unwrap();
        assert_eq!(config.snap.grid_size, 25.0);
        assert!(config.snap.enable_snapping);
        assert_eq!(config.history, HistoryConfig::default());
    }

    #[test]
    fn test_unknown_extension() {
        let err = Config::default()
            .save_to_file(Path::new("settings.yaml"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat(ext) if ext == "yaml"));
    }
}
