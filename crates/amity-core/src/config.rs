//! Configuration types for an Amity node
//!
//! Loaded from an optional JSON file and then overridden from the command
//! line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{AmityError, Result};

/// Main node configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Storage configuration
    pub storage: StorageConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Throttle configuration
    pub throttle: ThrottleConfig,
    /// User search configuration
    pub search: SearchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Read a configuration file (JSON)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AmityError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: NodeConfig = serde_json::from_str(&raw)
            .map_err(|e| AmityError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Reject configurations the node cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.secret.trim().is_empty() {
            return Err(AmityError::InvalidConfig("auth.secret must not be empty".into()));
        }
        if self.auth.access_token_ttl.is_zero() || self.auth.refresh_token_ttl.is_zero() {
            return Err(AmityError::InvalidConfig("token lifetimes must be non-zero".into()));
        }
        if self.auth.hash_iterations == 0 {
            return Err(AmityError::InvalidConfig("auth.hash_iterations must be non-zero".into()));
        }
        if self.throttle.friend_requests_per_minute == 0 {
            return Err(AmityError::InvalidConfig(
                "throttle.friend_requests_per_minute must be non-zero".into(),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(AmityError::InvalidConfig("storage.max_connections must be non-zero".into()));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port (0 = auto-assign)
    pub port: u16,
    /// Human-readable node name
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            name: "amity".to_string(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database backend
    pub backend: StorageBackend,
    /// SQLite database file
    pub database: PathBuf,
    /// Connection pool size
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database: PathBuf::from("amity.db"),
            max_connections: 5,
        }
    }
}

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite (default)
    Sqlite,
    /// In-memory (for testing)
    Memory,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC key for signing tokens
    pub secret: String,
    /// Lifetime of access tokens
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,
    /// Lifetime of refresh tokens
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: Duration,
    /// PBKDF2 rounds for new password hashes
    pub hash_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_ttl: Duration::from_secs(5 * 60),
            refresh_token_ttl: Duration::from_secs(24 * 60 * 60),
            hash_iterations: 100_000,
        }
    }
}

/// Throttle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Friend requests a single user may send per minute
    pub friend_requests_per_minute: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            friend_requests_per_minute: 3,
        }
    }
}

/// User search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on returned users
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 50 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

// Helper module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
