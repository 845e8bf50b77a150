//! XDG settings store adapter

use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;

use crate::domain::config::Settings;

/// Settings store errors
#[derive(Debug, Clone, Error)]
pub enum SettingsStoreError {
    #[error("Failed to read settings file: {0}")]
    ReadError(String),

    #[error("Failed to parse settings file: {0}")]
    ParseError(String),

    #[error("Failed to write settings file: {0}")]
    WriteError(String),
}

/// XDG-compliant settings store
pub struct XdgSettingsStore {
    path: PathBuf,
}

impl XdgSettingsStore {
    /// Create a store with the default path
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("clipbind");

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load settings from storage.
    ///
    /// A missing file is empty settings, not an error.
    pub async fn load(&self) -> Result<Settings, SettingsStoreError> {
        if !self.exists() {
            return Ok(Settings::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| SettingsStoreError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| SettingsStoreError::ParseError(e.to_string()))
    }

    /// Save settings to storage, creating the parent directory as needed
    pub async fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsStoreError::WriteError(e.to_string()))?;
        }

        let content = toml::to_string_pretty(settings)
            .map_err(|e| SettingsStoreError::WriteError(e.to_string()))?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| SettingsStoreError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Default for XdgSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
