//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding the SQLite database path.
pub const DATABASE_URL_VAR: &str = "ARENA_DATABASE_URL";

/// Environment variable overriding the listen port.
pub const PORT_VAR: &str = "ARENA_PORT";

/// Where matches and players are stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file.
    #[default]
    Sqlite,
    /// Process memory; lost on exit.
    Memory,
}

/// Configuration for the match server.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    host: String,

    /// Port to bind to.
    port: u16,

    /// Storage backend.
    storage: StorageBackend,

    /// Path of the SQLite database file.
    database_url: String,

    /// Milliseconds a connection waits on a locked database.
    busy_timeout_ms: u64,

    /// Tracing filter directive used when `RUST_LOG` is unset.
    log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            storage: StorageBackend::Sqlite,
            database_url: "arena.db".to_string(),
            busy_timeout_ms: crate::DEFAULT_BUSY_TIMEOUT_MS,
            log_filter: "info,arena_server=debug".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Keys missing from the file keep their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(storage = %config.storage, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if it exists, otherwise starts from defaults, then
    /// applies environment overrides.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `ARENA_DATABASE_URL` and `ARENA_PORT` as resolved by `lookup`.
    #[instrument(skip(self, lookup))]
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(DATABASE_URL_VAR) {
            debug!(database_url = %url, "Database url overridden from environment");
            self.database_url = url;
        }
        if let Some(port) = lookup(PORT_VAR) {
            self.port = port.trim().parse().map_err(|e| {
                ConfigError::new(format!("Invalid {}: '{}': {}", PORT_VAR, port, e))
            })?;
            debug!(port = self.port, "Port overridden from environment");
        }
        Ok(self)
    }

    /// Replaces the bind host.
    pub fn set_host(&mut self, host: String) {
        self.host = host;
    }

    /// Replaces the bind port.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Replaces the database path.
    pub fn set_database_url(&mut self, database_url: String) {
        self.database_url = database_url;
    }

    /// Replaces the storage backend.
    pub fn set_storage(&mut self, storage: StorageBackend) {
        self.storage = storage;
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
