//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use crate::constants::CONFIG_DIR_NAME;
use crate::models::BuiltinBehaviors;
use crate::services::merge::MergeOptions;
use crate::services::naming::NamingScheme;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Merge defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Appended to the target file stem when no output path is given
    pub output_suffix: String,
    /// Sort `holdTaps` and `macros` by name in written documents
    pub sort_behaviors: bool,
    /// Naming scheme applied to copied behaviors
    pub scheme: NamingScheme,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            output_suffix: "_with_hrm".to_string(),
            sort_behaviors: true,
            scheme: NamingScheme::default(),
        }
    }
}

/// Behavior registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Firmware behaviors beyond the built-in table (e.g. from custom devicetree)
    pub extra_builtins: Vec<String>,
}

/// Renaming settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Removed from descriptions of renamed behaviors
    pub strip_suffixes: Vec<String>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            strip_suffixes: vec![" - TailorKey".to_string()],
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Merge defaults
    pub merge: MergeConfig,
    /// Behavior registry settings
    pub behaviors: BehaviorConfig,
    /// Renaming settings
    pub rename: RenameConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/hrmkit/`
    /// - macOS: `~/Library/Application Support/hrmkit/`
    /// - Windows: `%APPDATA%\hrmkit\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .context(format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Loads `explicit` if given, the default config file otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        // Serialize to TOML
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");

        // Write to temp file
        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - `merge.output_suffix` is not empty (an empty suffix would overwrite the target)
    /// - every extra built-in behavior starts with `&`
    pub fn validate(&self) -> Result<()> {
        if self.merge.output_suffix.trim().is_empty() {
            anyhow::bail!("merge.output_suffix must not be empty");
        }

        if let Some(bad) = self
            .behaviors
            .extra_builtins
            .iter()
            .find(|name| !name.starts_with('&'))
        {
            anyhow::bail!("Built-in behavior '{}' must start with '&'", bad);
        }

        Ok(())
    }

    /// Built-in behavior table including configured extras.
    #[must_use]
    pub fn builtins(&self) -> BuiltinBehaviors {
        BuiltinBehaviors::with_extra(&self.behaviors.extra_builtins)
    }

    /// Merge options derived from this configuration.
    #[must_use]
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            builtins: self.builtins(),
            sort_behaviors: self.merge.sort_behaviors,
            strip_suffixes: self.rename.strip_suffixes.clone(),
        }
    }
}
