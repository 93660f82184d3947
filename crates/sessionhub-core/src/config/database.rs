//! Database configuration.

use serde::{Deserialize, Serialize};

/// Database connection pool configuration.
///
/// Connection settings are either given whole in `url` or taken from
/// the discrete host/port/credential fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full PostgreSQL connection URL. Takes precedence over the fields below.
    #[serde(default)]
    pub url: Option<String>,
    /// Database host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Database port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database user.
    #[serde(default = "default_username")]
    pub username: String,
    /// Database password.
    #[serde(default)]
    pub password: String,
    /// Database name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Maximum number of open connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Number of idle connections the pool keeps warm.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Timeout in seconds for acquiring a connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Maximum lifetime of a pooled connection in seconds.
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: u64,
}

impl DatabaseConfig {
    /// Return the configured URL, treating an empty string as unset.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: String::new(),
            name: default_name(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            max_lifetime_seconds: default_max_lifetime(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_username() -> String {
    "postgres".to_string()
}

fn default_name() -> String {
    "sessionhub".to_string()
}

fn default_max_connections() -> u32 {
    300
}

fn default_min_connections() -> u32 {
    15
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    30
}
