//! Named upstream connections.
//!
//! A connection is a base URL plus an authentication strategy. Connections
//! are defined once at startup and never change afterwards; the registry is
//! therefore shared freely between concurrent tool calls.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Name of the connection used by the built-in tools.
pub const DEFAULT_CONNECTION: &str = "default";

/// Base URL of the built-in `default` connection.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Authentication strategy of a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// No authentication header.
    #[default]
    None,

    /// A single header carrying an API key.
    ApiKey,

    /// `Authorization: Bearer <token>`.
    Bearer,

    /// Any strategy this server does not know about. Treated as no auth.
    #[serde(other)]
    Unknown,
}

impl AuthType {
    /// Parse an auth type name as it appears in configuration.
    ///
    /// Names match exactly, the same as the serde representation.
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "none" => Self::None,
            "api_key" => Self::ApiKey,
            "bearer" => Self::Bearer,
            _ => Self::Unknown,
        }
    }
}

/// A named upstream configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique name used to look the connection up.
    pub name: String,

    /// Base URL; endpoints are appended verbatim.
    pub base_url: String,

    /// Authentication strategy.
    #[serde(default)]
    pub auth_type: AuthType,

    /// Strategy-specific fields (`api_key`, `key_name`, `token`).
    #[serde(default)]
    pub auth_config: BTreeMap<String, String>,
}

impl Connection {
    /// Create an unauthenticated connection.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth_type: AuthType::None,
            auth_config: BTreeMap::new(),
        }
    }

    /// Set the authentication strategy.
    pub fn with_auth(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    /// Add one authentication field.
    pub fn with_auth_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_config.insert(key.into(), value.into());
        self
    }

    /// Look up an authentication field.
    pub fn auth_field(&self, key: &str) -> Option<&str> {
        self.auth_config.get(key).map(String::as_str)
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted: BTreeMap<&str, &str> = self
            .auth_config
            .keys()
            .map(|k| (k.as_str(), "[REDACTED]"))
            .collect();

        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("auth_type", &self.auth_type)
            .field("auth_config", &redacted)
            .finish()
    }
}

/// Read-only table of named connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, Connection>,
}

impl ConnectionRegistry {
    /// Build a registry from a list of connections.
    ///
    /// Later entries replace earlier ones with the same name.
    pub fn new(connections: impl IntoIterator<Item = Connection>) -> Self {
        Self {
            connections: connections
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
        }
    }

    /// Look up a connection by name. Absence is not an error.
    pub fn lookup(&self, name: &str) -> Option<&Connection> {
        self.connections.get(name)
    }

    /// Number of configured connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connection is configured.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// All configured connection names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
