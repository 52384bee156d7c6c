//! Database connection configuration.
//!
//! Supports configuration via environment variables:
//! - `YELP_DB_DRIVER`: Database driver (sqlite, snowflake)
//! - `YELP_DB_URL`: Connection string (file path for SQLite, DSN for Snowflake)

use std::env;

use crate::sql::Dialect;

use super::settings::expand_env_vars;

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}. Supported: sqlite, snowflake")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// SQLite file or in-memory database, queried in-process.
    Sqlite,
    /// Snowflake warehouse, queried through the database worker.
    Snowflake,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConnectionConfigError> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            "snowflake" | "sf" => Ok(Driver::Snowflake),
            other => Err(ConnectionConfigError::UnsupportedDriver(other.to_string())),
        }
    }

    /// Get the driver name for the worker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite => "sqlite",
            Driver::Snowflake => "snowflake",
        }
    }

    /// SQL dialect the report catalog must be rendered in.
    pub fn dialect(&self) -> Dialect {
        match self {
            Driver::Sqlite => Dialect::Sqlite,
            Driver::Snowflake => Dialect::Snowflake,
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database driver.
    pub driver: Driver,
    /// Driver-specific connection string, environment variables expanded.
    pub connection_string: String,
}

impl ConnectionConfig {
    /// Create a new connection config for a SQLite database file.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::Sqlite,
            connection_string: path.into(),
        }
    }

    /// Create a new connection config for Snowflake.
    pub fn snowflake(dsn: impl Into<String>) -> Self {
        Self {
            driver: Driver::Snowflake,
            connection_string: dsn.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `YELP_DB_DRIVER`: sqlite or snowflake
    /// - `YELP_DB_URL`: connection string (supports `${VAR}` expansion)
    pub fn from_env() -> Result<Self, ConnectionConfigError> {
        let driver_str = env::var("YELP_DB_DRIVER")
            .map_err(|_| ConnectionConfigError::MissingEnvVar("YELP_DB_DRIVER".to_string()))?;
        let driver = Driver::from_str(&driver_str)?;

        let raw = env::var("YELP_DB_URL")
            .map_err(|_| ConnectionConfigError::MissingEnvVar("YELP_DB_URL".to_string()))?;
        let connection_string = expand_env_vars(&raw)
            .map_err(|e| ConnectionConfigError::InvalidConfig(e.to_string()))?;

        if connection_string.trim().is_empty() {
            return Err(ConnectionConfigError::InvalidConfig(
                "YELP_DB_URL is empty".to_string(),
            ));
        }

        Ok(Self {
            driver,
            connection_string,
        })
    }

    /// Get the driver name for the worker.
    pub fn driver_name(&self) -> &'static str {
        self.driver.as_str()
    }

    /// The connection string with any `user:password@` credentials masked,
    /// safe for logs.
    pub fn redacted(&self) -> String {
        let s = &self.connection_string;
        let Some(at) = s.find('@') else {
            return s.clone();
        };
        let userinfo_start = s.find("://").map(|i| i + 3).unwrap_or(0);
        if userinfo_start > at {
            return s.clone();
        }
        match s[userinfo_start..at].find(':') {
            Some(colon) => {
                let colon = userinfo_start + colon;
                format!("{}:****{}", &s[..colon], &s[at..])
            }
            None => s.clone(),
        }
    }
}
