//! Top-level propsync configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ApplierConfig, LogFormat, LoggingConfig, SchemaConfig};
use crate::errors::ConfigError;
use crate::schema::PropertySchema;

/// Project config file name, looked up in the root passed to [`PropsyncConfig::load`].
pub const PROJECT_CONFIG_FILE: &str = "propsync.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`PROPSYNC_*`)
/// 3. Project config (`propsync.toml` in the given root)
/// 4. User config (`~/.propsync/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PropsyncConfig {
    pub applier: ApplierConfig,
    pub logging: LoggingConfig,
    pub schema: SchemaConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub reject_unversioned: Option<bool>,
    pub validate_snapshot: Option<bool>,
}

impl PropsyncConfig {
    /// Load configuration with layered resolution.
    ///
    /// A missing user or project file is not an error. A user file that fails
    /// to parse is.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                Self::merge_toml_file(&mut config, &user_config_path)?;
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &PropsyncConfig) -> Result<(), ConfigError> {
        if let Some(format) = &config.logging.format {
            if let Err(message) = format.parse::<LogFormat>() {
                return Err(ConfigError::ValidationFailed {
                    field: "logging.format".to_string(),
                    message,
                });
            }
        }
        if let Some(level) = &config.logging.level {
            if level.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "logging.level".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        config.schema.build_schema()?;
        Ok(())
    }

    /// Build the property schema this config describes.
    pub fn build_schema(&self) -> Result<PropertySchema, ConfigError> {
        self.schema.build_schema()
    }

    /// Returns the user config path: `~/.propsync/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut PropsyncConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: PropsyncConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value. Schema entries accumulate.
    fn merge(base: &mut PropsyncConfig, other: &PropsyncConfig) {
        // Applier
        if other.applier.reject_unversioned.is_some() {
            base.applier.reject_unversioned = other.applier.reject_unversioned;
        }
        if other.applier.validate_snapshot.is_some() {
            base.applier.validate_snapshot = other.applier.validate_snapshot;
        }

        // Logging
        if other.logging.level.is_some() {
            base.logging.level = other.logging.level.clone();
        }
        if other.logging.format.is_some() {
            base.logging.format = other.logging.format.clone();
        }

        // Schema
        if other.schema.builtin.is_some() {
            base.schema.builtin = other.schema.builtin;
        }
        base.schema
            .properties
            .extend(other.schema.properties.iter().cloned());
    }

    /// Apply environment variable overrides.
    /// Pattern: `PROPSYNC_LOG_LEVEL`, `PROPSYNC_REJECT_UNVERSIONED`, etc.
    fn apply_env_overrides(config: &mut PropsyncConfig) {
        if let Ok(val) = std::env::var("PROPSYNC_LOG_LEVEL") {
            config.logging.level = Some(val);
        }
        if let Ok(val) = std::env::var("PROPSYNC_LOG_FORMAT") {
            config.logging.format = Some(val);
        }
        if let Ok(val) = std::env::var("PROPSYNC_REJECT_UNVERSIONED") {
            if let Ok(v) = val.parse::<bool>() {
                config.applier.reject_unversioned = Some(v);
            }
        }
        if let Ok(val) = std::env::var("PROPSYNC_VALIDATE_SNAPSHOT") {
            if let Ok(v) = val.parse::<bool>() {
                config.applier.validate_snapshot = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut PropsyncConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.log_level {
            config.logging.level = Some(v.clone());
        }
        if let Some(ref v) = cli.log_format {
            config.logging.format = Some(v.clone());
        }
        if let Some(v) = cli.reject_unversioned {
            config.applier.reject_unversioned = Some(v);
        }
        if let Some(v) = cli.validate_snapshot {
            config.applier.validate_snapshot = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level propsync config directory: `~/.propsync/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".propsync"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
