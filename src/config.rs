//! Configuration file parser for ~/.config/storefeed/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde but reported back to the caller, which
//! logs them once tracing is initialized since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Items requested per feed page. Must be > 0.
    pub page_size: u32,

    /// Base URL of the item service. When unset the static catalog is used.
    pub provider_url: Option<String>,

    /// JSON catalog file for the static provider (bundled demo catalog if unset).
    pub catalog_path: Option<PathBuf>,

    /// Per-request timeout for the HTTP provider.
    pub request_timeout_secs: u64,

    /// Maximum HTTP response body size.
    pub max_response_bytes: usize,

    /// Longer queries are rejected without contacting the provider.
    pub max_query_length: usize,

    /// Fallback tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: crate::controller::DEFAULT_PAGE_SIZE,
            provider_url: None,
            catalog_path: None,
            request_timeout_secs: 15,
            max_response_bytes: 5 * 1024 * 1024,
            max_query_length: crate::search::DEFAULT_MAX_QUERY_LENGTH,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "page_size",
        "provider_url",
        "catalog_path",
        "request_timeout_secs",
        "max_response_bytes",
        "max_query_length",
        "log_level",
    ];

    /// Default config location: `$HOME/.config/storefeed/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("storefeed")
                .join("config.toml")
        })
    }

    /// Load configuration from a TOML file.
    ///
    /// Returns the config together with any unknown top-level keys. Nothing is
    /// logged here: this runs before the subscriber exists.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, returned to the caller
    /// - `page_size = 0` → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<(Self, Vec<String>), ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((Self::default(), Vec::new()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            // Race condition: file deleted between metadata and read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((Self::default(), Vec::new()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content).map(|(config, _)| config)
    }

    fn parse(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        if content.trim().is_empty() {
            return Ok((Self::default(), Vec::new()));
        }

        let raw: toml::Table = content.parse()?;
        let unknown_keys = raw
            .keys()
            .filter(|key| !Self::KNOWN_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();

        let config: Config = toml::Value::Table(raw).try_into()?;
        config.validate()?;
        Ok((config, unknown_keys))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be greater than 0".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
