//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `SESSIONHUB__*` environment variables. Each sub-module
//! represents a logical configuration section.

pub mod database;
pub mod logging;
pub mod session;
pub mod usage;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;
pub use self::usage::UsageConfig;

use crate::error::AppError;

/// Legacy environment variable naming the instance this process serves.
pub const INSTANCE_ENV_VAR: &str = "INSTANCE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session scoping settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Usage accounting settings.
    #[serde(default)]
    pub usage: UsageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay and
    /// environment variables prefixed with `SESSIONHUB__`. When no instance
    /// is configured, the `INSTANCE` environment variable is consulted.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SESSIONHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let mut app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        if app.session.instance.is_none() {
            app.session.instance = std::env::var(INSTANCE_ENV_VAR).ok();
        }

        app.usage.validate()?;
        Ok(app)
    }
}
