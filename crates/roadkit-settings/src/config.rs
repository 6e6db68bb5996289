//! Editor configuration
//!
//! Settings are grouped by concern and persisted as JSON or TOML, chosen by
//! the file extension. Every load and save is validated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use roadkit_core::{DEFAULT_LINK_THRESHOLD, MIN_LANESECTION_LENGTH, MIN_SPLIT_MARGIN};

use crate::error::{SettingsError, SettingsResult};

/// Link inference settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingSettings {
    /// Maximum endpoint distance for two roads to be linked
    pub threshold: f64,
}

impl Default for LinkingSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LINK_THRESHOLD,
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Commands kept on the undo stack before the oldest is dropped
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_depth: 200 }
    }
}

/// Limits applied by splitting commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingSettings {
    /// Minimum length of either half when a lane section is split
    pub min_lane_section_length: f64,
    /// Minimum distance of a road split from the road ends
    pub split_margin: f64,
}

impl Default for EditingSettings {
    fn default() -> Self {
        Self {
            min_lane_section_length: MIN_LANESECTION_LENGTH,
            split_margin: MIN_SPLIT_MARGIN,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub linking: LinkingSettings,
    pub history: HistorySettings,
    pub editing: EditingSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(Format::Json)
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        Ok(Format::Toml)
    } else {
        Err(SettingsError::UnsupportedFormat(
            path.extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ))
    }
}

impl EditorConfig {
    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format_of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        info!(path = %path.display(), "editor configuration loaded");
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "editor configuration saved");
        Ok(())
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Platform configuration file, e.g. `~/.config/roadkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("roadkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("could not determine config directory".into())
            })
    }

    /// Validate all settings
    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.linking.threshold > 0.0) {
            return Err(SettingsError::invalid("linking.threshold", "must be > 0"));
        }
        if self.history.max_depth == 0 {
            return Err(SettingsError::invalid("history.max_depth", "must be > 0"));
        }
        if !(self.editing.min_lane_section_length > 0.0) {
            return Err(SettingsError::invalid(
                "editing.min_lane_section_length",
                "must be > 0",
            ));
        }
        if !(self.editing.split_margin >= 0.0) {
            return Err(SettingsError::invalid(
                "editing.split_margin",
                "must be >= 0",
            ));
        }
        Ok(())
    }
}
