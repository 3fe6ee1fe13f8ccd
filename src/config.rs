//! Configuration file handling.
//!
//! This module provides loading and saving of vulnquery configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/vulnquery/config.toml`
//! - macOS: `~/Library/Application Support/vulnquery/config.toml`
//! - Windows: `%APPDATA%\vulnquery\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! endpoint = "https://api.osv.dev/v1/query"
//! user_agent = "vulns-app/1.0"
//! accept = "application/geo+json"
//! timeout_secs = 30
//! log_level = "warn"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// OSV query endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.osv.dev/v1/query";

pub const DEFAULT_USER_AGENT: &str = "vulns-app/1.0";

/// Sent as the `Accept` header. OSV answers with plain JSON regardless.
pub const DEFAULT_ACCEPT: &str = "application/geo+json";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
///
/// Missing keys fall back to their defaults, so a partial file is valid.
///
/// # Example
///
/// ```no_run
/// use vulnquery::Config;
///
/// let config = Config::load().unwrap();
/// println!("Querying {}", config.endpoint);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL the query is POSTed to.
    pub endpoint: String,

    /// Value of the `User-Agent` header.
    pub user_agent: String,

    /// Value of the `Accept` header.
    pub accept: String,

    /// Request timeout, in seconds.
    ///
    /// Default: 30
    pub timeout_secs: u64,

    /// Log filter used when `RUST_LOG` is unset (e.g. "warn", "vulnquery=debug").
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vulnquery")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The settings an OSV query will actually use, one per line.
    pub fn query_settings(&self) -> String {
        format!(
            "Endpoint:   {}\nTimeout:    {}s\nUser-Agent: {}\nAccept:     {}",
            self.endpoint, self.timeout_secs, self.user_agent, self.accept
        )
    }
}
