//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default public base URL used to build task-module page links.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3978/";

/// Bot configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Public base URL of the bot's web pages. Always ends with `/`.
    pub base_url: String,
    /// Port for the HTTP messaging endpoint.
    pub port: u16,
    /// libSQL database path. `None` keeps all state in memory.
    pub db_path: Option<PathBuf>,
    /// Whether to attach the stdin/stdout channel.
    pub cli_enabled: bool,
    /// How many times a turn is replayed after a persistence conflict.
    pub max_turn_attempts: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            port: 3978,
            db_path: None,
            cli_enabled: true,
            max_turn_attempts: 3,
        }
    }
}

impl BotConfig {
    /// Build configuration from `BOT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = std::env::var("BOT_BASE_URL")
            .map(|url| normalize_base_url(&url))
            .unwrap_or(defaults.base_url);

        let port = parse_env("BOT_PORT")?.unwrap_or(defaults.port);
        let max_turn_attempts = parse_env("BOT_MAX_TURN_ATTEMPTS")?
            .unwrap_or(defaults.max_turn_attempts);
        if max_turn_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "BOT_MAX_TURN_ATTEMPTS".into(),
                message: "must be at least 1".into(),
            });
        }

        let db_path = std::env::var("BOT_DB_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cli_enabled = match std::env::var("BOT_CLI") {
            Ok(v) => parse_flag("BOT_CLI", &v)?,
            Err(_) => defaults.cli_enabled,
        };

        Ok(Self {
            base_url,
            port,
            db_path,
            cli_enabled,
            max_turn_attempts,
        })
    }

    /// Override the base URL (normalized).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_base_url(url);
        self
    }
}

/// Ensure the base URL ends with exactly one trailing slash.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
