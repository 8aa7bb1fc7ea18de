//! Layered configuration for socialsync.
//!
//! Values come from `.socialsync/socialsync.toml` (or an explicit path), then
//! environment overrides, then CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [remote]
//! base_url = "http://localhost:3000"
//! timeout_secs = 10
//! token = "session-token"
//!
//! [search]
//! debounce_ms = 300
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const CONFIG_DIR: &str = ".socialsync";
pub const CONFIG_FILE: &str = "socialsync.toml";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

/// Where the social API lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Session token sent as a bearer credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a search is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Contents of `socialsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialsyncToml {
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl SocialsyncToml {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse socialsync.toml")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content =
            toml::to_string_pretty(self).context("Failed to serialize socialsync.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Human-readable problems with the configuration. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Err(e) = check_base_url(&self.remote.base_url) {
            warnings.push(e.to_string());
        }
        if self.remote.timeout_secs == 0 {
            warnings.push("remote.timeout_secs is 0; every request would time out".to_string());
        }
        if self.search.debounce_ms > 5_000 {
            warnings.push(format!(
                "search.debounce_ms = {} is unusually long for search-as-you-type",
                self.search.debounce_ms
            ));
        }
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            warnings.push(format!(
                "logging.level '{}' is not a valid filter",
                self.logging.level
            ));
        }
        warnings
    }
}

fn check_base_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidBaseUrl(url.to_string()))
    }
}

/// Default location of the config file for a working directory.
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Fallback location under the user's config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("socialsync").join(CONFIG_FILE))
}

/// Effective configuration after all layers are applied.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub remote: RemoteSettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration for `dir`: explicit path, then the project file,
    /// then the user file, then defaults. Environment overrides apply last.
    pub fn load(dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let candidate = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let project = config_path(dir);
                if project.exists() {
                    Some(project)
                } else {
                    user_config_path().filter(|p| p.exists())
                }
            }
        };

        let (toml, source) = match candidate {
            Some(path) => (SocialsyncToml::load(&path)?, Some(path)),
            None => (SocialsyncToml::default(), None),
        };

        let mut config = Self {
            remote: toml.remote,
            search: toml.search,
            logging: toml.logging,
            source,
        };
        config.apply_env();
        check_base_url(&config.remote.base_url)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(url) = env_override("SOCIALSYNC_BASE_URL") {
            self.remote.base_url = url;
        }
        if let Some(token) = env_override("SOCIALSYNC_TOKEN") {
            self.remote.token = Some(token);
        }
    }
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
