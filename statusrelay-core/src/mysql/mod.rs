//! MySQL status source backed by a single-connection sqlx pool.
//!
//! # Module Structure
//! - `connection`: connect options and pool creation
//!
//! The session is marked read-only and only the one status statement is
//! ever executed on it.

pub mod connection;

#[cfg(test)]
mod tests;

use crate::{
    Result,
    collector::{StatusRow, StatusSource},
    config::DatabaseConfig,
    error::RelayError,
    security::Credentials,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{Executor, MySqlPool, Row};
use tracing::{debug, info};

pub use connection::{connect_options, create_status_pool};

/// Reads global status through an open MySQL connection.
pub struct MySqlStatusSource {
    pool: MySqlPool,
    config: DatabaseConfig,
}

impl std::fmt::Debug for MySqlStatusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlStatusSource")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

impl MySqlStatusSource {
    /// Opens the connection eagerly so that unreachable servers and bad
    /// credentials fail here rather than at query time.
    ///
    /// # Errors
    /// Returns a configuration error for invalid settings, or a connection
    /// error if the server cannot be reached or refuses the login.
    pub async fn connect(config: &DatabaseConfig, credentials: &Credentials) -> Result<Self> {
        info!(
            "Connecting to {}",
            connection::display_target(config, credentials)
        );
        let pool = create_status_pool(config, credentials).await?;
        Ok(Self::from_pool(pool, config.clone()))
    }

    /// Wraps an existing pool.
    pub const fn from_pool(pool: MySqlPool, config: DatabaseConfig) -> Self {
        Self { pool, config }
    }

    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Closes the underlying connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl StatusSource for MySqlStatusSource {
    async fn fetch_status(&self, query: &str) -> Result<Vec<StatusRow>> {
        let mut stream = self.pool.fetch(query);
        let mut rows = Vec::new();

        while let Some(row) = stream
            .try_next()
            .await
            .map_err(|e| RelayError::collection_failed("Failed to execute status query", e))?
        {
            let index = rows.len();
            // Status columns carry binary collations on some MySQL and MariaDB
            // versions, which the checked decode rejects.
            let name: String = row
                .try_get_unchecked(0)
                .map_err(|e| RelayError::parse_field("name", index, e))?;
            let value: String = row
                .try_get_unchecked(1)
                .map_err(|e| RelayError::parse_field("value", index, e))?;
            rows.push(StatusRow { name, value });
        }

        debug!("Status query returned {} rows", rows.len());
        Ok(rows)
    }
}
