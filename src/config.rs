//! Configuration file handling.
//!
//! Settings are passed explicitly into the resolver as a [`Config`] value;
//! nothing in the library reads the process environment. The binary builds
//! one from the TOML file and then applies command-line overrides.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/advisory-pin/config.toml`
//! - macOS: `~/Library/Application Support/advisory-pin/config.toml`
//! - Windows: `%APPDATA%\advisory-pin\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! api_url = "https://api.github.com"
//! ecosystem = "pip"
//! severity = "critical"
//! sample_window = 20
//! per_page = 30
//! request_timeout_secs = 30
//! default_format = "table"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Severity;
use crate::selector::DEFAULT_SAMPLE_WINDOW;

/// Settings for one resolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the GitHub REST API.
    pub api_url: String,

    /// Access token for the advisory feed. Usually supplied through
    /// `GITHUB_TOKEN` rather than stored here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Package ecosystem to query, e.g. `pip`.
    pub ecosystem: String,

    /// Severity the feed is filtered to.
    pub severity: Severity,

    /// How many leading advisories the random start index is drawn from.
    pub sample_window: usize,

    /// Page size requested from the feed.
    pub per_page: u32,

    /// Deadline for the advisory fetch, in seconds.
    pub request_timeout_secs: u64,

    /// Output format when no `--format` flag is given: "table" or "json".
    pub default_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            ecosystem: "pip".to_string(),
            severity: Severity::Critical,
            sample_window: DEFAULT_SAMPLE_WINDOW,
            per_page: 30,
            request_timeout_secs: 30,
            default_format: "table".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or defaults if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to `path`, creating the parent directory if
    /// needed.
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

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("advisory-pin")
            .join("config.toml")
    }

    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}
