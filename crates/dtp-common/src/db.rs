//! PostgreSQL connection configuration
//!
//! Both the ETL pipeline and the read API connect with the same
//! `POSTGRES_*` environment variables; the pool is built once at startup
//! and shared for the process lifetime.

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::env;
use std::time::Duration;

/// Default maximum database connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default database connection timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Load database configuration from `POSTGRES_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            host: env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string()),
            database: env::var("POSTGRES_DB").unwrap_or_else(|_| "drone_traffic".to_string()),
            user: env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: env::var("POSTGRES_PASSWORD").unwrap_or_default(),
            max_connections: env::var("POSTGRES_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            connect_timeout_secs: env::var("POSTGRES_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            anyhow::bail!("Database host cannot be empty");
        }
        if self.database.is_empty() {
            anyhow::bail!("Database name cannot be empty");
        }
        if self.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }
        Ok(())
    }

    /// Compose the connection options. Credentials are passed through
    /// typed setters rather than a `postgres://` URL, so passwords with
    /// URL-reserved characters need no escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }

    /// Build the connection pool.
    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .connect_with(self.connect_options())
            .await?;

        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_composition() {
        let config = DatabaseConfig {
            host: "db.example.com".to_string(),
            database: "drone_traffic".to_string(),
            user: "etl".to_string(),
            // Reserved URL characters must survive unmangled.
            password: "p@ss/w#rd".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        let options = config.connect_options();

        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_username(), "etl");
        assert_eq!(options.get_database(), Some("drone_traffic"));
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let config = DatabaseConfig {
            host: String::new(),
            database: "drone_traffic".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_connections: 5,
            connect_timeout_secs: 10,
        };

        assert!(config.validate().is_err());
    }
}
