//! User settings persisted as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::{read_json, write_json_atomic};
use crate::Result;

/// Persisted user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Translate titles and bodies when reading.
    #[serde(default)]
    pub translation_enabled: bool,
}

/// Settings bound to their backing file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load settings from `path`. A missing file gives the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings: Settings = read_json(&path)?.unwrap_or_default();
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn translation_enabled(&self) -> bool {
        self.settings.translation_enabled
    }

    /// Write the current settings.
    pub fn save(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.settings)
    }

    /// Flip translation on or off and save. Returns the new state.
    pub fn toggle_translation(&mut self) -> Result<bool> {
        self.settings.translation_enabled = !self.settings.translation_enabled;
        self.save()?;
        info!(
            "Translation {}",
            if self.settings.translation_enabled {
                "enabled"
            } else {
                "disabled"
            }
        );
        Ok(self.settings.translation_enabled)
    }
}
