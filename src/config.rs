//! Server and client configuration.

use crate::session::DEFAULT_RETENTION_SECS;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Runtime configuration.
///
/// Loaded from an optional TOML file, then overridden by environment
/// variables (`HOST`, `PORT`, `FRONTEND_URL`, `BOT_TOKEN`, `BOT_API_URL`,
/// `SESSION_RETENTION_SECS`, `POLL_INTERVAL_MS`).
#[derive(Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Front-end URL used to build invite links and game URLs.
    #[serde(default = "default_invite_base_url")]
    invite_base_url: String,

    /// Seconds a session lives before a create call may sweep it.
    #[serde(default = "default_retention_secs")]
    retention_secs: i64,

    /// Client polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// Chat bot token; score reporting is disabled without it.
    #[serde(default)]
    #[setters(strip_option)]
    bot_token: Option<String>,

    /// Bot API root.
    #[serde(default = "default_bot_api_url")]
    bot_api_url: String,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    8000
}

#[instrument]
fn default_invite_base_url() -> String {
    "http://localhost:8000".to_string()
}

#[instrument]
fn default_retention_secs() -> i64 {
    DEFAULT_RETENTION_SECS
}

#[instrument]
fn default_poll_interval_ms() -> u64 {
    1000
}

#[instrument]
fn default_bot_api_url() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            invite_base_url: default_invite_base_url(),
            retention_secs: default_retention_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            bot_token: None,
            bot_api_url: default_bot_api_url(),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("invite_base_url", &self.invite_base_url)
            .field("retention_secs", &self.retention_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("bot_api_url", &self.bot_api_url)
            .finish()
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.retention()?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file when it exists, otherwise starts from defaults, then
    /// applies environment overrides.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup` (normally the process
    /// environment).
    #[instrument(skip(self, lookup))]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PORT '{}': {}", port, e)))?;
        }
        if let Some(url) = lookup("FRONTEND_URL") {
            self.invite_base_url = url;
        }
        if let Some(token) = lookup("BOT_TOKEN").filter(|t| !t.is_empty()) {
            self.bot_token = Some(token);
        }
        if let Some(url) = lookup("BOT_API_URL") {
            self.bot_api_url = url;
        }
        if let Some(secs) = lookup("SESSION_RETENTION_SECS") {
            self.retention_secs = secs.parse().map_err(|e| {
                ConfigError::new(format!("Invalid SESSION_RETENTION_SECS '{}': {}", secs, e))
            })?;
        }
        if let Some(ms) = lookup("POLL_INTERVAL_MS") {
            self.poll_interval_ms = ms.parse().map_err(|e| {
                ConfigError::new(format!("Invalid POLL_INTERVAL_MS '{}': {}", ms, e))
            })?;
        }

        self.retention()?;
        if self.retention_secs <= 0 {
            warn!(retention_secs = self.retention_secs, "Non-positive retention sweeps every session on create");
        }
        Ok(self)
    }

    /// Session retention as a duration.
    ///
    /// Fails when the seconds overflow a duration or push the sweep cutoff
    /// outside the representable date range.
    pub fn retention(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_seconds(self.retention_secs)
            .filter(|d| chrono::Utc::now().checked_sub_signed(*d).is_some())
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "SESSION_RETENTION_SECS out of range: {}",
                    self.retention_secs
                ))
            })
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
