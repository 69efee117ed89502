use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::changelog::ChangelogOptions;
use crate::error::{PrereleaseError, Result};
use crate::schema::DEFAULT_SCHEMA_SUFFIX;

/// File name looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "prerelease.toml";

/// Represents the complete configuration for prerelease.
///
/// Contains changelog rendering options, schema extraction settings and the
/// repository layout.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub schema: SchemaConfig,

    #[serde(default)]
    pub repository: RepositoryConfig,
}

/// Configuration for changelog rendering.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ChangelogConfig {
    /// Only report entries with this scope; empty reports all scopes
    #[serde(default)]
    pub scope: String,

    /// Issue tracker base URL used for ticket links
    #[serde(default)]
    pub ticket_base_url: String,
}

impl ChangelogConfig {
    pub fn to_options(&self) -> ChangelogOptions {
        ChangelogOptions::new(Some(self.scope.clone()), self.ticket_base_url.clone())
    }
}

fn default_schema_suffix() -> String {
    DEFAULT_SCHEMA_SUFFIX.to_string()
}

/// Configuration for schema script extraction.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SchemaConfig {
    #[serde(default = "default_schema_suffix")]
    pub suffix: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            suffix: default_schema_suffix(),
        }
    }
}

fn default_trunk_branch() -> String {
    "master".to_string()
}

/// Configuration for the repository being reported on.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryConfig {
    /// Branch whose history is compared against the latest tag
    #[serde(default = "default_trunk_branch")]
    pub trunk_branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            trunk_branch: default_trunk_branch(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `prerelease.toml` in current directory
/// 3. `.prerelease.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        read_config_file(Path::new(path))?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        read_config_file(Path::new(CONFIG_FILE_NAME))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            read_config_file(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(config_str: &str) -> Result<Config> {
    toml::from_str(config_str)
        .map_err(|e| PrereleaseError::config(format!("Invalid configuration: {}", e)))
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        PrereleaseError::config(format!("Cannot read '{}': {}", path.display(), e))
    })
}
