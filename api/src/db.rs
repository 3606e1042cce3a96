//! Database connection module for `ClickHouse`.
//!
//! This module provides configuration and a shared client for the `ClickHouse` signal
//! store. It is only used when `OTELGATE_STORAGE=clickhouse`.

use anyhow::{Context, Result};
use clickhouse::Client;
use std::sync::Arc;

/// Database configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `ClickHouse` database URL (e.g., <http://localhost:8123>)
    pub url: String,
    /// Database name to use
    pub database: String,
    /// Username for authentication
    pub user: String,
    /// Password for authentication
    pub password: String,
}

impl DatabaseConfig {
    /// Load database configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTELGATE_DB_URL`: Database URL (default: <http://localhost:8123>)
    /// - `OTELGATE_DB_NAME`: Database name (default: "otelgate")
    /// - `OTELGATE_DB_USER`: Database user (default: "otelgate")
    /// - `OTELGATE_DB_PASSWORD`: Database password (default: "`otelgate_dev`")
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load database configuration reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            url: lookup("OTELGATE_DB_URL").unwrap_or_else(|| "http://localhost:8123".to_string()),
            database: lookup("OTELGATE_DB_NAME").unwrap_or_else(|| "otelgate".to_string()),
            user: lookup("OTELGATE_DB_USER").unwrap_or_else(|| "otelgate".to_string()),
            password: lookup("OTELGATE_DB_PASSWORD")
                .unwrap_or_else(|| "otelgate_dev".to_string()),
        }
    }
}

/// Database client wrapper.
#[derive(Clone)]
pub struct Database {
    client: Arc<Client>,
}

impl Database {
    /// Create a new database client from configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// # use api::db::{Database, DatabaseConfig};
    /// let config = DatabaseConfig::from_env();
    /// let db = Database::new(&config);
    /// ```
    #[must_use]
    pub fn new(config: &DatabaseConfig) -> Self {
        let client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database)
            .with_user(&config.user)
            .with_password(&config.password);

        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying `ClickHouse` client.
    #[must_use]
    pub fn client(&self) -> Arc<Client> {
        Arc::clone(&self.client)
    }

    /// Test database connectivity by executing a simple query.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or the query fails.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .context("Failed to ping database")?;
        Ok(())
    }
}
