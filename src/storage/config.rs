//! Configuration handling for crewplan
//!
//! Configuration is stored in `.crewplan/config.toml` (project) and
//! `~/.config/crewplan/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EngineConfig;

/// Name of the per-project data directory
pub const PROJECT_DIR: &str = ".crewplan";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Scheduling engine settings
    pub engine: EngineConfig,
}

impl ProjectConfig {
    /// Rejects settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.ranker_capacity == 0 {
            return Err(ConfigError::Invalid(
                "engine.ranker_capacity must be at least 1".to_string(),
            ));
        }
        if self.engine.rotation_capacity == 0 {
            return Err(ConfigError::Invalid(
                "engine.rotation_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Log level used when neither `--verbose` nor `CREWPLAN_LOG` is set
    pub log_level: Option<String>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Locates and reads the global and project config files
pub struct Config;

impl Config {
    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "crewplan", "crewplan").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, falling back to defaults if absent
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;
        config.validate().context("Invalid project config")?;

        Ok(config)
    }

    /// Writes `config` to the project's config file
    pub fn save_project_config(project_root: &Path, config: &ProjectConfig) -> Result<()> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        let body = toml::to_string_pretty(config).context("Failed to serialize project config")?;
        let content = format!("# crewplan project configuration\n\n{}", body);

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }

    /// Finds the project root by walking up from the current directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the nearest ancestor of `start` (inclusive) holding `.crewplan/`
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).is_dir())
            .map(Path::to_path_buf)
    }
}
