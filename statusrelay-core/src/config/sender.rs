//! Zabbix server endpoint settings.

use crate::{Result, error::RelayError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Zabbix trapper port.
pub const DEFAULT_ZABBIX_PORT: u16 = 10051;

/// Where to deliver metrics and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Zabbix server or proxy address
    pub server: String,
    /// Trapper port
    pub port: u16,
    /// Deadline for establishing the TCP connection
    pub connect_timeout: Duration,
    /// Deadline for each of the write and the response read
    pub io_timeout: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            port: DEFAULT_ZABBIX_PORT,
            connect_timeout: Duration::from_secs(10),
            io_timeout: Duration::from_secs(10),
        }
    }
}

impl SenderConfig {
    /// Settings for `server:port` with default timeouts.
    pub fn new(server: String, port: u16) -> Self {
        Self {
            server,
            port,
            ..Default::default()
        }
    }

    /// Builder method to set both timeouts.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.io_timeout = timeout;
        self
    }

    /// `server:port`, bracketing IPv6 literals.
    pub fn address(&self) -> String {
        if self.server.contains(':') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }

    /// Validates sender settings.
    ///
    /// # Errors
    /// Returns a configuration error for an empty server, a zero port, or a
    /// zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.server.is_empty() {
            return Err(RelayError::configuration("zabbix server cannot be empty"));
        }
        if self.port == 0 {
            return Err(RelayError::configuration(
                "zabbix port must be greater than 0",
            ));
        }
        if self.connect_timeout.is_zero() || self.io_timeout.is_zero() {
            return Err(RelayError::configuration(
                "zabbix timeouts must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_config_defaults() {
        let config = SenderConfig::default();
        assert_eq!(config.port, 10051);
        assert_eq!(config.address(), "127.0.0.1:10051");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sender_config_ipv6_address() {
        let config = SenderConfig::new("::1".to_string(), 10051);
        assert_eq!(config.address(), "[::1]:10051");
    }

    #[test]
    fn test_sender_config_validation() {
        assert!(SenderConfig::new(String::new(), 10051).validate().is_err());
        assert!(SenderConfig::new("zbx".to_string(), 0).validate().is_err());
        assert!(
            SenderConfig::default()
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }
}
