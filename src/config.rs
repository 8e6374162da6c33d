//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME, DARK_OVERRIDE_GROUP, LIGHT_GROUP};
use crate::models::NamedRegion;

/// Theme display mode preference for the terminal admin editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    /// Automatically detect OS theme (dark/light)
    #[default]
    Auto,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory holding persisted content (defaults to `<config dir>/storage`)
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    /// Directory the remote content payloads are mirrored into, if any
    #[serde(default)]
    pub remote_mirror_dir: Option<PathBuf>,
    /// File contact form submissions are appended to, if any
    #[serde(default)]
    pub contact_outbox: Option<PathBuf>,
}

/// A single tracked page region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Region identifier (matches the fragment used to link to it)
    pub id: String,
    /// Visibility ratio override; the section default applies when absent
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Semantic groups, e.g. "light-background" or "dark-override"
    #[serde(default)]
    pub groups: Vec<String>,
}

impl RegionConfig {
    fn new(id: &str, groups: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            threshold: None,
            groups: groups.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Region tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionsConfig {
    /// Default visibility ratio for regions without their own threshold
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Tracked regions in page order
    #[serde(default = "default_regions")]
    pub tracked: Vec<RegionConfig>,
}

fn default_threshold() -> f64 {
    0.1
}

fn default_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig::new("achievements", &[LIGHT_GROUP]),
        RegionConfig::new("about-us", &[LIGHT_GROUP]),
        RegionConfig::new("gallery", &[]),
        RegionConfig::new("admissions", &[LIGHT_GROUP]),
        RegionConfig::new("testimonials", &[DARK_OVERRIDE_GROUP]),
        RegionConfig::new("contact", &[LIGHT_GROUP]),
    ]
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            tracked: default_regions(),
        }
    }
}

impl RegionsConfig {
    /// Builds the named regions described by this configuration.
    pub fn named_regions(&self) -> Vec<NamedRegion> {
        self.tracked
            .iter()
            .map(|region| NamedRegion {
                id: region.id.as_str().into(),
                threshold: region.threshold.unwrap_or(self.threshold),
                groups: region.groups.clone(),
            })
            .collect()
    }
}

/// Upload limits for banner images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted image size in bytes
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Durable storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Total bytes the storage directory may hold (0 disables the quota)
    pub quota_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Content editor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// How long a remote write may take before the save is reported as failed
    pub save_timeout_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_timeout_ms: 10_000,
        }
    }
}

impl EditorConfig {
    /// Save timeout as a [`Duration`].
    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }
}

/// Navigation and scrolling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Delay before the single retry when a fragment target is not mounted yet
    pub fragment_retry_ms: u64,
    /// Vertical offset after which the header switches to its scrolled style
    pub scroll_threshold_px: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            fragment_retry_ms: 100,
            scroll_threshold_px: 50,
        }
    }
}

impl NavigationConfig {
    /// Fragment retry delay as a [`Duration`].
    pub fn fragment_retry(&self) -> Duration {
        Duration::from_millis(self.fragment_retry_ms)
    }
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Theme mode preference (Auto, Dark, Light)
    #[serde(default)]
    pub theme_mode: ThemeMode,
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/CampusView/config.toml`
/// - macOS: `~/Library/Application Support/CampusView/config.toml`
/// - Windows: `%APPDATA%\CampusView\config.toml`
///
/// Setting `CAMPUS_VIEW_CONFIG_DIR` replaces the directory entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Tracked regions and theme groups
    #[serde(default)]
    pub regions: RegionsConfig,
    /// Upload limits
    #[serde(default)]
    pub uploads: UploadConfig,
    /// Durable storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Content editor settings
    #[serde(default)]
    pub editor: EditorConfig,
    /// Navigation settings
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path.
    ///
    /// Honors `CAMPUS_VIEW_CONFIG_DIR`, otherwise:
    /// - Linux: `~/.config/CampusView/`
    /// - macOS: `~/Library/Application Support/CampusView/`
    /// - Windows: `%APPDATA%\CampusView\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Resolves the storage directory, falling back to `<config dir>/storage`.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.paths.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join("storage")),
        }
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path()?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, &config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - every threshold lies in [0, 1]
    /// - region ids are non-empty and unique
    /// - the upload limit is non-zero
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.regions.threshold) {
            anyhow::bail!(
                "Default region threshold must be between 0 and 1 (got {})",
                self.regions.threshold
            );
        }

        let mut seen = HashSet::new();
        for region in &self.regions.tracked {
            if region.id.trim().is_empty() {
                anyhow::bail!("Region id cannot be empty");
            }
            if !seen.insert(region.id.as_str()) {
                anyhow::bail!("Region '{}' is listed more than once", region.id);
            }
            if let Some(threshold) = region.threshold {
                if !(0.0..=1.0).contains(&threshold) {
                    anyhow::bail!(
                        "Threshold for region '{}' must be between 0 and 1 (got {})",
                        region.id,
                        threshold
                    );
                }
            }
        }

        if self.uploads.max_bytes == 0 {
            anyhow::bail!("Upload limit must be greater than zero");
        }

        Ok(())
    }
}
