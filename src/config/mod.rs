//! Configuration module.
//!
//! Handles connection configuration, environment variables, and settings.

mod connection;
mod settings;

pub use connection::{ConnectionConfig, ConnectionConfigError, Driver};
pub use settings::{
    expand_env_vars, ConnectionSettings, DashboardSettings, PoolSettings, Settings,
    SettingsError, WorkerSettings,
};
