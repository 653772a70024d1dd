use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

/// Environment variable that overrides the configured API token.
pub const API_TOKEN_ENV: &str = "SALON_API_TOKEN";

const SETTINGS_FILE: &str = "settings.toml";

/// Loads and stores [`Settings`] as TOML.
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service for the platform config directory, or `settings.toml` in the
    /// working directory when there is none.
    pub fn from_default_location() -> Self {
        let path = ProjectDirs::from("com", "SalonSuite", "SalonCalendar")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file. A missing file yields the defaults.
    pub fn get(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    /// Write settings, creating the parent directory when needed.
    pub fn update(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }

    /// Settings for startup: broken files fall back to defaults, and the token
    /// environment variable wins over the file.
    pub fn load_or_default(&self) -> Settings {
        let mut settings = match self.get() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                Settings::default()
            }
        };
        apply_env_overrides(&mut settings, std::env::var(API_TOKEN_ENV).ok());
        settings
    }
}

fn apply_env_overrides(settings: &mut Settings, token: Option<String>) {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        settings.api_token = Some(token);
    }
}
