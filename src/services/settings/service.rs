use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

const CONFIG_FILE: &str = "config.toml";

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service bound to `config.toml` in the platform config directory.
    pub fn from_project_dirs() -> Result<Self> {
        let dirs = project_dirs().context("Failed to resolve the configuration directory")?;
        Ok(Self::new(dirs.config_dir().join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from disk.
    pub fn load(&self) -> Result<Settings> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings at {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse settings at {}", self.path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unusable.
    pub fn load_or_default(&self) -> Settings {
        if !self.path.exists() {
            log::info!(
                "No settings file at {}, using defaults",
                self.path.display()
            );
            return Settings::default();
        }

        match self.load() {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{:#}; using default settings", err);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let raw = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }
}

/// Platform directories for config and data files.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "lifecalendar", "LifeCalendar")
}
