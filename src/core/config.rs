//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, a connections file, or defaults.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use crate::domains::api::{
    ApiDispatcher, AuthType, Connection, ConnectionRegistry, DEFAULT_BASE_URL, DEFAULT_CONNECTION,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream API connections.
    pub api: ApiConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Upstream API configuration.
///
/// Read once at startup; the resulting registry is never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Named upstream connections.
    pub connections: Vec<Connection>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL`, defaulting to `info`.
    ///
    /// Usable before the rest of the configuration is loaded, so the
    /// subscriber is in place when loading logs its warnings.
    pub fn from_env() -> Self {
        std::env::var("MCP_LOG_LEVEL")
            .map(|level| Self { level })
            .unwrap_or_default()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            connections: vec![Connection::new(DEFAULT_CONNECTION, DEFAULT_BASE_URL)],
            timeout_secs: ApiDispatcher::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ApiConfig {
    /// Build the read-only connection registry.
    pub fn registry(&self) -> ConnectionRegistry {
        ConnectionRegistry::new(self.connections.iter().cloned())
    }

    /// The per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Insert a connection, replacing any existing one with the same name.
    pub fn upsert(&mut self, connection: Connection) {
        match self
            .connections
            .iter_mut()
            .find(|c| c.name == connection.name)
        {
            Some(existing) => *existing = connection,
            None => self.connections.push(connection),
        }
    }

    /// The connection named `default`, created if missing.
    fn default_connection_mut(&mut self) -> &mut Connection {
        let index = match self
            .connections
            .iter()
            .position(|c| c.name == DEFAULT_CONNECTION)
        {
            Some(index) => index,
            None => {
                self.connections
                    .push(Connection::new(DEFAULT_CONNECTION, DEFAULT_BASE_URL));
                self.connections.len() - 1
            }
        };
        &mut self.connections[index]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "Todo List MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_API_BASE_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        // Extra connections first, so the MCP_API_* variables below win
        if let Ok(path) = std::env::var("MCP_CONNECTIONS_FILE") {
            match load_connections_file(&path) {
                Ok(connections) => {
                    info!("Loaded {} connection(s) from {}", connections.len(), path);
                    for connection in connections {
                        config.api.upsert(connection);
                    }
                }
                Err(e) => warn!("Ignoring connections file {}: {}", path, e),
            }
        }

        config.apply_default_connection_env();

        if let Ok(timeout) = std::env::var("MCP_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => config.api.timeout_secs = secs,
                _ => warn!(
                    "Invalid MCP_API_TIMEOUT_SECS '{}', keeping {}s",
                    timeout, config.api.timeout_secs
                ),
            }
        }

        config
    }

    /// Apply `MCP_API_*` overrides to the `default` connection.
    fn apply_default_connection_env(&mut self) {
        let vars = [
            "MCP_API_BASE_URL",
            "MCP_API_AUTH_TYPE",
            "MCP_API_KEY",
            "MCP_API_KEY_NAME",
            "MCP_API_TOKEN",
        ];
        if vars.iter().all(|v| std::env::var(v).is_err()) {
            return;
        }

        let connection = self.api.default_connection_mut();

        if let Ok(base_url) = std::env::var("MCP_API_BASE_URL") {
            connection.base_url = base_url;
        }

        if let Ok(auth_type) = std::env::var("MCP_API_AUTH_TYPE") {
            connection.auth_type = AuthType::parse(&auth_type);
            if connection.auth_type == AuthType::Unknown {
                warn!(
                    "Unknown MCP_API_AUTH_TYPE '{}', requests will be sent without auth",
                    auth_type
                );
            }
        }

        for (var, field) in [
            ("MCP_API_KEY", "api_key"),
            ("MCP_API_KEY_NAME", "key_name"),
            ("MCP_API_TOKEN", "token"),
        ] {
            if let Ok(value) = std::env::var(var) {
                connection.auth_config.insert(field.to_string(), value);
            }
        }

        info!(
            "Default connection: {} (auth: {:?})",
            connection.base_url, connection.auth_type
        );
    }
}

/// Read a JSON array of connections from disk.
pub fn load_connections_file(path: impl AsRef<Path>) -> Result<Vec<Connection>> {
    let raw = std::fs::read_to_string(path)?;
    let connections: Vec<Connection> = serde_json::from_str(&raw)?;

    if let Some(bad) = connections.iter().find(|c| c.base_url.is_empty()) {
        return Err(Error::config(format!(
            "connection '{}' has an empty base_url",
            bad.name
        )));
    }

    Ok(connections)
}
