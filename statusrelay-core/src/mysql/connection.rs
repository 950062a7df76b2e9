//! MySQL connection setup.
//!
//! # Security Features
//! - The password is handed to sqlx directly and never formatted into a URL
//!   that could reach a log line unredacted
//! - Sessions are switched to read-only before use
//! - The pool is capped at one connection with a bounded acquire timeout

use crate::{
    Result,
    config::DatabaseConfig,
    error::{RelayError, redact_database_url},
    security::Credentials,
};
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use url::Url;

/// Builds sqlx connect options from config and credentials.
pub fn connect_options(config: &DatabaseConfig, credentials: &Credentials) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(credentials.username())
        .database(&config.database);

    match credentials.password() {
        Some(password) => options.password(password),
        None => options,
    }
}

/// Human-readable connection target with the password masked.
pub(crate) fn display_target(config: &DatabaseConfig, credentials: &Credentials) -> String {
    let host = if config.host.contains(':') {
        format!("[{}]", config.host)
    } else {
        config.host.clone()
    };

    let Ok(mut url) = Url::parse(&format!(
        "mysql://{}:{}/{}",
        host, config.port, config.database
    )) else {
        return "<redacted>".to_string();
    };
    let _ = url.set_username(credentials.username());
    let _ = url.set_password(credentials.password());

    redact_database_url(url.as_str())
}

/// Opens a one-connection pool for status collection.
///
/// # Errors
/// Returns a configuration error if `config` is invalid, or a connection
/// error if the first connection cannot be established.
pub async fn create_status_pool(
    config: &DatabaseConfig,
    credentials: &Credentials,
) -> Result<MySqlPool> {
    use sqlx::Executor;

    config.validate()?;

    let read_only = config.read_only;

    MySqlPoolOptions::new()
        .max_connections(1)
        .min_connections(0)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(false)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if read_only {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                }
                Ok(())
            })
        })
        .connect_with(connect_options(config, credentials))
        .await
        .map_err(|e| {
            RelayError::connection_failed(
                format!(
                    "Failed to connect to MySQL at {}",
                    display_target(config, credentials)
                ),
                e,
            )
        })
}
