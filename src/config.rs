//! Configuration handling
//!
//! Configuration is read from `--config` (or `$TASKPLAN_CONFIG`), then
//! `./taskplan.toml`, then `~/.config/taskplan/config.toml`. Missing files
//! fall back to built-in defaults; a file that exists but does not parse is
//! an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "taskplan.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Defaults applied when converting stored task records into engine tasks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntakeConfig {
    /// Hours assumed when a record has no estimate
    pub default_estimated_hours: f64,

    /// Title given to records without one
    pub untitled_title: String,

    /// When set, records without a due date get `now + N days`
    pub default_due_in_days: Option<i64>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            default_estimated_hours: 5.0,
            untitled_title: "Untitled Task".to_string(),
            default_due_in_days: None,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Request intake settings
    pub intake: IntakeConfig,
}

impl Config {
    /// Parses and validates configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hours = self.intake.default_estimated_hours;
        if !hours.is_finite() || hours < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "intake.default_estimated_hours must be a non-negative number, got {}",
                hours
            )));
        }

        if self.intake.untitled_title.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "intake.untitled_title must not be empty".to_string(),
            ));
        }

        if let Some(days) = self.intake.default_due_in_days {
            if days < 0 {
                return Err(ConfigError::Invalid(format!(
                    "intake.default_due_in_days must not be negative, got {}",
                    days
                )));
            }
        }

        Ok(())
    }

    /// Loads configuration, returning the file it came from if any
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let config = Self::load_file(path)?;
            return Ok((config, Some(path.to_path_buf())));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            let config = Self::load_file(&local)?;
            return Ok((config, Some(local)));
        }

        if let Some(dir) = Self::global_config_dir() {
            let global = dir.join("config.toml");
            if global.is_file() {
                let config = Self::load_file(&global)?;
                return Ok((config, Some(global)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Loads configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskplan", "taskplan").map(|dirs| dirs.config_dir().to_path_buf())
    }
}
