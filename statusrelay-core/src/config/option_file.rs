//! MySQL option file (`my.cnf` style) support.
//!
//! Only the `[client]` section is read, and only `host`, `port`, `user` and
//! `password`. Keys that are present override the corresponding command-line
//! values; absent keys leave them alone.

use crate::{Result, config::DatabaseConfig, error::RelayError, security::Credentials};
use ini::Ini;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// Values found in the `[client]` section.
#[derive(Default)]
pub struct ClientOptions {
    /// `host` key
    pub host: Option<String>,
    /// `port` key
    pub port: Option<u16>,
    /// `user` key
    pub user: Option<String>,
    /// `password` key
    pub password: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

impl ClientOptions {
    /// Overrides `config` and `credentials` with the keys that were present.
    pub fn apply(&self, config: &mut DatabaseConfig, credentials: &mut Credentials) {
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(user) = &self.user {
            credentials.set_username(user.clone());
        }
        if let Some(password) = &self.password {
            credentials.set_password(Some(password.as_str().to_owned()));
        }
    }
}

/// Reads the `[client]` section of the option file at `path`.
///
/// # Errors
/// Returns a configuration error if the file cannot be read or parsed, or if
/// `port` is not a valid port number.
pub fn load_client_options(path: &Path) -> Result<ClientOptions> {
    let contents = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
        RelayError::configuration(format!(
            "Failed to read option file {}: {}",
            path.display(),
            e
        ))
    })?);
    debug!("Loaded option file {}", path.display());
    parse_client_options(&contents).map_err(|e| match e {
        RelayError::Configuration { message } => {
            RelayError::configuration(format!("{}: {}", path.display(), message))
        }
        other => other,
    })
}

/// Parses option file text and extracts the `[client]` section.
///
/// `!include`/`!includedir` directives and bare boolean options such as
/// `skip-ssl` are ignored.
///
/// # Errors
/// Returns a configuration error for malformed syntax or an invalid port.
pub fn parse_client_options(contents: &str) -> Result<ClientOptions> {
    let filtered: String = contents
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            trimmed.is_empty()
                || trimmed.starts_with('[')
                || trimmed.starts_with('#')
                || trimmed.starts_with(';')
                || (!trimmed.starts_with('!') && trimmed.contains('='))
        })
        .map(|line| format!("{}\n", line))
        .collect();
    let filtered = Zeroizing::new(filtered);

    let ini = Ini::load_from_str(&filtered).map_err(|e| {
        RelayError::configuration(format!("Failed to parse option file: {}", e))
    })?;

    let Some(section) = ini.section(Some("client")) else {
        return Ok(ClientOptions::default());
    };

    let port = section
        .get("port")
        .map(|raw| {
            raw.trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port > 0)
                .ok_or_else(|| {
                    RelayError::configuration(format!("invalid port '{}' in [client]", raw))
                })
        })
        .transpose()?;

    Ok(ClientOptions {
        host: section.get("host").map(str::to_string),
        port,
        user: section.get("user").map(str::to_string),
        password: section
            .get("password")
            .map(|p| Zeroizing::new(p.to_string())),
    })
}
