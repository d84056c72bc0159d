//! Configuration file parser for ~/.config/rssdiff/config.toml.
//!
//! The config file is optional. A missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, and a warning is logged for each one
//! since they are usually typos.
use serde::Deserialize;
use std::path::Path;
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
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP settings used by [`crate::FeedReader`].
    pub fetch: FetchConfig,
}

/// Settings for the HTTP client behind `parse_url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound for the whole exchange: connect, headers and body.
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Responses with a larger body are rejected.
    pub max_feed_bytes: usize,

    /// Reject localhost and private-network URLs before connecting.
    pub block_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("rssdiff/", env!("CARGO_PKG_VERSION")).to_string(),
            max_feed_bytes: 10 * 1024 * 1024, // 10MB
            block_private_hosts: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 1] = ["fetch"];
    const KNOWN_FETCH_KEYS: [&'static str; 4] = [
        "timeout_secs",
        "user_agent",
        "max_feed_bytes",
        "block_private_hosts",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // NotFound covers a missing file and one deleted between stat and read
        let content = match Self::read_bounded(path) {
            Ok(content) => content,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw);
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            timeout_secs = config.fetch.timeout_secs,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Reads the file after checking it against `MAX_FILE_SIZE`.
    fn read_bounded(path: &Path) -> Result<String, ConfigError> {
        let len = std::fs::metadata(path)?.len();
        if len > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "Config file is {len} bytes (max {} bytes)",
                Self::MAX_FILE_SIZE
            )));
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

fn warn_unknown_keys(raw: &toml::Table) {
    for (key, value) in raw {
        if !Config::KNOWN_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            continue;
        }
        if let Some(fetch) = value.as_table() {
            for fetch_key in fetch.keys() {
                if !Config::KNOWN_FETCH_KEYS.contains(&fetch_key.as_str()) {
                    tracing::warn!(key = %format!("fetch.{fetch_key}"), "Unknown key in config file, ignoring");
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
