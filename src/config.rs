//! Configuration management for personaldb.
//!
//! Handles loading the optional TOML configuration file. Every field has a
//! default, so a missing file is equivalent to an empty one.

use crate::error::{DbError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Address the server listens on unless overridden.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Main configuration structure for personaldb.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database handle settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    DEFAULT_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

impl ServerConfig {
    /// Parses the configured address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.addr
            .parse()
            .map_err(|e| DbError::config(format!("Invalid listen address '{}': {e}", self.addr)))
    }
}

/// Which statement classifier the dispatcher uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Ask SQLite whether the prepared statement is read-only.
    #[default]
    Engine,
    /// Parse the statement and inspect its leading construct.
    Keyword,
}

/// Database handle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long SQLite waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// Statement classifier strategy.
    #[serde(default)]
    pub classifier: ClassifierKind,
}

fn default_max_connections() -> u32 {
    4
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
            classifier: ClassifierKind::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

impl Config {
    /// Returns the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("personaldb")
            .join("config.toml")
    }

    /// Loads configuration from a file, returning defaults if it does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DbError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            DbError::config(format!("Invalid config file {}: {e}", path.display()))
        })
    }
}
