//! Configuration file handling.
//!
//! Settings for the `vulnrange` command line tool, stored as TOML.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/vulnrange/config.toml`
//! - macOS: `~/Library/Application Support/vulnrange/config.toml`
//! - Windows: `%APPDATA%\vulnrange\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! db_path = "/var/lib/vulnrange/advisories"
//! default_ecosystem = "npm"
//! default_format = "table"
//! log_level = "warn"
//!
//! [ignore]
//! vulnerabilities = ["CVE-2021-12345"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration.
///
/// Every field has a default, so a partial file is valid.
///
/// # Example
///
/// ```no_run
/// use vulnrange::Config;
///
/// let config = Config::load().unwrap();
/// println!("Default ecosystem: {}", config.default_ecosystem);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Advisory store location: a JSON file or a bucket directory.
    ///
    /// Default: none, `--db` must be given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Ecosystem used when `--ecosystem` is not given.
    ///
    /// Default: "npm"
    pub default_ecosystem: String,

    /// Output format when `--format` is not given.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Log filter used when `RUST_LOG` is unset.
    ///
    /// Default: "warn"
    pub log_level: String,

    /// Findings to leave out of reports.
    pub ignore: IgnoreConfig,
}

/// Vulnerabilities suppressed from reports, e.g. accepted risks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Vulnerability IDs to drop (e.g., "CVE-2021-12345", "GHSA-xxxx").
    pub vulnerabilities: Vec<String>,
}

impl IgnoreConfig {
    pub fn should_ignore_vulnerability(&self, vuln_id: &str) -> bool {
        self.vulnerabilities.iter().any(|id| id == vuln_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            default_ecosystem: "npm".to_string(),
            default_format: "table".to_string(),
            log_level: "warn".to_string(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    ///
    /// Returns the defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::config_path())
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vulnrange")
            .join("config.toml")
    }

    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}
