//! TOML-based configuration for the dashboard.
//!
//! Supports a config file (yelp-insights.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.local]
//! driver = "sqlite"
//! connection_string = "./data/yelp.db"
//!
//! [connections.warehouse]
//! driver = "snowflake"
//! connection_string = "${SNOWFLAKE_DSN}"
//!
//! [tables]
//! businesses = "TBL_YELP_BUSINESSES"
//! reviews = "TBL_YELP_REVIEWS"
//!
//! [dashboard]
//! title = "Yelp Data Analysis Dashboard"
//! reports = ["category_business_counts", "monthly_reviews"]
//! display_rows = 25
//!
//! [worker]
//! path = "./yelp-worker"
//! timeout_secs = 120
//!
//! [worker.pool]
//! max_idle_conns = 2
//! max_open_conns = 4
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::connection::{ConnectionConfig, Driver};
use crate::catalog::TableNames;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("No connection configured; add [connections.<name>] or set YELP_DB_DRIVER and YELP_DB_URL")]
    NoConnection,

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Physical names of the source tables.
    pub tables: TableNames,

    /// Dashboard presentation.
    pub dashboard: DashboardSettings,

    /// Worker configuration.
    pub worker: WorkerSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database driver (sqlite, snowflake).
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,
}

impl ConnectionSettings {
    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }

    /// Resolve into a ready-to-use connection config.
    pub fn to_config(&self) -> Result<ConnectionConfig, SettingsError> {
        Ok(ConnectionConfig {
            driver: self.driver_type()?,
            connection_string: self.resolved_connection_string()?,
        })
    }
}

/// Dashboard presentation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Page title.
    pub title: String,

    /// Report ids to run; empty runs the whole catalog.
    pub reports: Vec<String>,

    /// Maximum table rows shown by the terminal renderer.
    pub display_rows: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            title: "Yelp Data Analysis Dashboard".to_string(),
            reports: Vec::new(),
            display_rows: 25,
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary.
    pub path: Option<String>,

    /// Request timeout in seconds. A query running longer fails the report.
    pub timeout_secs: u64,

    /// Connection pool settings.
    pub pool: PoolSettings,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 120,
            pool: PoolSettings::default(),
        }
    }
}

impl DashboardSettings {
    /// Report ids to run: an explicit request replaces the configured
    /// subset. Empty means the whole catalog.
    pub fn report_selection<'a>(&'a self, requested: &'a [String]) -> &'a [String] {
        if requested.is_empty() {
            &self.reports
        } else {
            requested
        }
    }
}

impl WorkerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of idle connections per pool.
    pub max_idle_conns: u32,

    /// Maximum number of open connections per pool.
    pub max_open_conns: u32,

    /// Maximum connection lifetime (e.g., "5m", "1h").
    pub conn_max_lifetime: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 2,
            max_open_conns: 4,
            conn_max_lifetime: "5m".to_string(),
        }
    }
}

impl PoolSettings {
    /// Convert to worker command-line arguments.
    pub fn to_worker_args(&self) -> Vec<String> {
        vec![
            "-pool".to_string(),
            format!("-pool-max-idle={}", self.max_idle_conns),
            format!("-pool-max-open={}", self.max_open_conns),
            format!("-pool-conn-lifetime={}", self.conn_max_lifetime),
        ]
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text and validate them.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `YELP_INSIGHTS_CONFIG`
    /// 2. `./yelp-insights.toml`
    /// 3. `~/.config/yelp-insights/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("YELP_INSIGHTS_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("yelp-insights.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("yelp-insights").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        self.tables
            .validate()
            .map_err(|e| SettingsError::InvalidConfig(e.to_string()))?;
        for (name, conn) in &self.connections {
            conn.driver_type()?;
            if conn.connection_string.trim().is_empty() {
                return Err(SettingsError::InvalidConfig(format!(
                    "connection '{}' has an empty connection_string",
                    name
                )));
            }
        }
        if self.worker.timeout_secs == 0 {
            return Err(SettingsError::InvalidConfig(
                "worker.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection: the one named "default", or the only one
    /// defined.
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        if self.connections.len() == 1 {
            return self.connections.iter().next().map(|(k, v)| (k.as_str(), v));
        }
        None
    }

    /// Resolve the connection to use.
    ///
    /// An explicit name must exist in the file. Without a name the default
    /// connection is used, falling back to `YELP_DB_*` environment variables.
    pub fn resolve_connection(&self, name: Option<&str>) -> Result<ConnectionConfig, SettingsError> {
        if let Some(name) = name {
            return self.get_connection(name)?.to_config();
        }
        if let Some((_, conn)) = self.default_connection() {
            return conn.to_config();
        }
        ConnectionConfig::from_env().map_err(|_| SettingsError::NoConnection)
    }

    /// Get the worker binary path.
    ///
    /// Returns the configured path, or searches common locations and `PATH`.
    pub fn worker_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.worker.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        // Search common locations
        let candidates = ["yelp-worker", "./yelp-worker", "./worker/yelp-worker"];

        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        // Try PATH
        if let Ok(output) = std::process::Command::new("which")
            .arg("yelp-worker")
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
