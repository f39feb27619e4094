use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::TagPattern;
use crate::error::{GateError, Result};

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "releasegate.toml";

/// Represents the complete configuration for release-gate.
///
/// Contains the manifest location, tag naming, remote behavior, build targets
/// and the external commands that build and publish a release.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_targets")]
    pub targets: Vec<String>,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub build: Option<BuildConfig>,

    #[serde(default)]
    pub publish: Option<PublishConfig>,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("Cargo.toml")
}

fn default_tag_pattern() -> String {
    "v{version}".to_string()
}

fn default_targets() -> Vec<String> {
    vec!["x86_64-unknown-linux-gnu".to_string()]
}

fn default_remote_name() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

/// Remote the tag namespace is shared through.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,

    /// Fetch remote tags before checking
    #[serde(default = "default_true")]
    pub fetch: bool,

    /// Push the created tag
    #[serde(default = "default_true")]
    pub push: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            name: default_remote_name(),
            fetch: true,
            push: true,
        }
    }
}

/// Command run once per target, and the artifacts it must leave behind.
///
/// `{tag}`, `{version}`, `{target}` and `{commit}` are substituted in both.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    pub command: String,

    #[serde(default)]
    pub artifacts: Vec<String>,
}

/// Command run once with every collected artifact.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    pub command: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            manifest: default_manifest(),
            tag_pattern: default_tag_pattern(),
            targets: default_targets(),
            remote: RemoteConfig::default(),
            build: None,
            publish: None,
        }
    }
}

impl Config {
    /// Parsed tag pattern
    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(self.tag_pattern.clone())
    }

    /// Checks values serde cannot: placeholder presence, target list, empty commands.
    pub fn validate(&self) -> Result<()> {
        self.tag_pattern()?;

        if self.targets.is_empty() {
            return Err(GateError::config("At least one build target is required"));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.trim().is_empty() {
                return Err(GateError::config("Build targets must not be empty"));
            }
            if !seen.insert(target.as_str()) {
                return Err(GateError::config(format!(
                    "Build target '{}' is listed more than once",
                    target
                )));
            }
        }

        if self.remote.name.trim().is_empty() {
            return Err(GateError::config("Remote name must not be empty"));
        }

        if let Some(build) = &self.build {
            if build.command.trim().is_empty() {
                return Err(GateError::config("[build] command must not be empty"));
            }
        }

        if let Some(publish) = &self.publish {
            if publish.command.trim().is_empty() {
                return Err(GateError::config("[publish] command must not be empty"));
            }
        }

        Ok(())
    }
}

/// Parses and validates configuration text.
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)
        .map_err(|e| GateError::config(format!("Invalid configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releasegate.toml` in current directory
/// 3. `.releasegate.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err(GateError::Config)` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(CONFIG_FILE).exists() {
        PathBuf::from(CONFIG_FILE)
    } else if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join(format!(".{}", CONFIG_FILE));
        if global.exists() {
            global
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        GateError::config(format!("Cannot read config '{}': {}", path.display(), e))
    })?;
    parse_config(&config_str)
}
