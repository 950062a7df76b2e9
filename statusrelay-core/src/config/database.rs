//! MySQL connection settings.

use crate::{Result, error::RelayError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default MySQL port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Where and how to reach the MySQL server.
///
/// # Example
/// ```rust
/// use statusrelay_core::config::DatabaseConfig;
///
/// let config = DatabaseConfig::new("db1.internal".to_string()).with_port(3307);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "DatabaseConfig(db1.internal:3307/information_schema)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Schema selected on connect; status views do not depend on it
    pub database: String,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Whether to mark the session read-only
    pub read_only: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_MYSQL_PORT,
            database: "information_schema".to_string(),
            connect_timeout: Duration::from_secs(10),
            read_only: true,
        }
    }
}

impl std::fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DatabaseConfig({}:{}/{})",
            self.host, self.port, self.database
        )
    }
}

impl DatabaseConfig {
    /// Creates a config for `host` with defaults for everything else.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set the connect timeout.
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validates connection parameters.
    ///
    /// # Errors
    /// Returns a configuration error for an empty host or database, a zero
    /// port, or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(RelayError::configuration("database host cannot be empty"));
        }

        if self.port == 0 {
            return Err(RelayError::configuration(
                "database port must be greater than 0",
            ));
        }

        if self.database.is_empty() {
            return Err(RelayError::configuration("database name cannot be empty"));
        }

        if self.connect_timeout.is_zero() {
            return Err(RelayError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3306);
        assert_eq!(config.database, "information_schema");
        assert!(config.read_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_validation() {
        let config = DatabaseConfig {
            host: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DatabaseConfig::default().with_port(0);
        assert!(config.validate().is_err());

        let config = DatabaseConfig::default().with_connect_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
