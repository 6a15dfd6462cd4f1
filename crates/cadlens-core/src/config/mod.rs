//! Configuration management for CadLens.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a missing file or a
//! partial file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::registry::{ModelDescriptor, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for CadLens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analysis run settings
    pub analysis: AnalysisConfig,

    /// Image canonicalization settings
    pub canonicalize: CanonicalizeConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Remote provider settings
    pub providers: ProvidersConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Extra catalogue entries, merged over the built-in models by id
    pub models: Vec<ModelDescriptor>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.cadlens.cadlens/config.toml
    /// - Linux: ~/.config/cadlens/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\cadlens\config\config.toml
    ///
    /// Falls back to ~/.cadlens/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "cadlens", "cadlens")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let expanded = shellexpand::tilde("~/.cadlens/config.toml");
                PathBuf::from(expanded.into_owned())
            })
    }

    /// Build the model catalogue: built-ins plus the `[[models]]` entries.
    pub fn registry(&self) -> ModelRegistry {
        ModelRegistry::with_extra(&self.models)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
