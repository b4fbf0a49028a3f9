//! Configuration management for the client.

use crate::{CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default chat server WebSocket URL.
pub const DEFAULT_SERVER_URL: &str = "wss://sync.driftchat.dev/ws";

/// Default broadcast channel name for sync signals.
pub const DEFAULT_CHANNEL_NAME: &str = "driftchat-sync";

/// Default delay between reconnect attempts, in milliseconds.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// Default number of reconnect attempts before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Chat server WebSocket URL.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Delay between reconnect attempts, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Reconnect attempts before the link gives up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Broadcast channel name used for sync signals.
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

fn default_max_reconnect_attempts() -> u32 {
    DEFAULT_MAX_RECONNECT_ATTEMPTS
}

fn default_channel_name() -> String {
    DEFAULT_CHANNEL_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("DRIFTCHAT_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(server_url) = std::env::var("DRIFTCHAT_SERVER_URL") {
            self.server_url = server_url;
        }
    }

    /// Get the server URL as a parsed URL.
    pub fn server_url(&self) -> CoreResult<Url> {
        Url::parse(&self.server_url).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.reconnect_delay_ms, 3000);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.channel_name, DEFAULT_CHANNEL_NAME);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        let config_json = r#"{
            "log_level": "debug",
            "server_url": "wss://example.com/ws"
        }"#;

        std::fs::write(&config_path, config_json).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.server_url, "wss://example.com/ws");
        // Omitted fields fall back to serde defaults
        assert_eq!(config.reconnect_delay_ms, 3000);
        assert_eq!(config.max_reconnect_attempts, 5);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.log_level = "trace".to_string();
        config.reconnect_delay_ms = 50;

        config.save(&paths).unwrap();

        let loaded = Config::load(&paths).unwrap();
        assert_eq!(loaded.log_level, "trace");
        assert_eq!(loaded.reconnect_delay_ms, 50);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_config_server_url_parse() {
        let config = Config::default();
        let url = config.server_url().unwrap();
        assert_eq!(url.scheme(), "wss");
    }

    #[test]
    fn test_config_invalid_url() {
        let mut config = Config::default();
        config.server_url = "not a valid url".to_string();

        assert!(config.server_url().is_err());
    }
}
