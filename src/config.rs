//! Configuration file parser for ~/.config/blogdesk/config.toml.
//!
//! The config file is optional. A missing or empty file yields
//! `Config::default()`, and unknown keys are accepted with a warning.
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use thiserror::Error;

/// Environment variable that overrides `api_token` from the file.
pub const TOKEN_ENV_VAR: &str = "BLOGDESK_TOKEN";

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
// Configuration
// ============================================================================

/// Top-level configuration.
///
/// Every field has a default, so any subset of keys may be given.
/// `Debug` masks the API token.
#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the blog's admin API.
    pub api_base_url: String,

    /// Sent in the `From` header and recorded as article author.
    pub username: Option<String>,

    /// Sent verbatim in the `Authorization` header.
    /// `BLOGDESK_TOKEN` takes precedence over this value.
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_token: Option<SecretString>,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Retries for 5xx / 429 responses before giving up.
    pub max_retries: u32,

    /// First retry delay; doubles on every further attempt, up to one minute.
    pub retry_base_delay_ms: u64,

    /// How long a cached category list stays valid. 0 disables caching.
    pub category_cache_ttl_minutes: i64,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            username: None,
            api_token: None,
            request_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            category_cache_ttl_minutes: 30,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("username", &self.username)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field(
                "category_cache_ttl_minutes",
                &self.category_cache_ttl_minutes,
            )
            .finish()
    }
}

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "api_base_url",
        "username",
        "api_token",
        "request_timeout_secs",
        "max_retries",
        "retry_base_delay_ms",
        "category_cache_ttl_minutes",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Over 1 MB → `Err(ConfigError::TooLarge)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), api = %config.api_base_url, "Loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides. The token variable wins over the file.
    pub fn with_env_overrides(self) -> Self {
        self.with_token_override(std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Replace the file token with `token`, unless it is missing or blank.
    fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            tracing::debug!(var = TOKEN_ENV_VAR, "API token taken from environment");
            self.api_token = Some(SecretString::from(token));
        }
        self
    }
}
