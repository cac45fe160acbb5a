//! Configuration management for the zenclass API
//!
//! Configuration comes from defaults, an optional TOML file and environment
//! variables, applied in that order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::server::config::ServerConfig;

/// Default MongoDB connection string
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/zenclassdb";

/// Database used when the connection string names none
pub const DEFAULT_DATABASE_NAME: &str = "zenclassdb";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub uri: String,

    /// Fallback database name when `uri` has no default database
    pub database_name: String,

    /// Create the collection indexes at startup
    pub ensure_indexes: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::from(DEFAULT_MONGODB_URI),
            database_name: String::from(DEFAULT_DATABASE_NAME),
            ensure_indexes: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from defaults and environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            self.database.uri = uri;
        }

        if let Ok(name) = std::env::var("MONGODB_DATABASE") {
            self.database.database_name = name;
        }

        if let Ok(host) = std::env::var("HOST") {
            let ip = host
                .parse()
                .with_context(|| format!("HOST is not an IP address: {host}"))?;
            self.server.bind_address.set_ip(ip);
        }

        if let Ok(port) = std::env::var("PORT") {
            let port = port
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
            self.server.bind_address.set_port(port);
        }

        if let Ok(level) = std::env::var("ZENCLASS_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("ZENCLASS_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Replace the log format and revalidate
    pub fn set_log_format(&mut self, format: impl Into<String>) -> Result<()> {
        self.logging.format = format.into();
        self.validate()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;

        if !self.database.uri.starts_with("mongodb://")
            && !self.database.uri.starts_with("mongodb+srv://")
        {
            anyhow::bail!("database.uri must be a mongodb:// or mongodb+srv:// connection string");
        }

        if self.database.database_name.trim().is_empty() {
            anyhow::bail!("database.database_name must not be empty");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }
}
