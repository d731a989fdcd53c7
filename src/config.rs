//! Database connection settings.
//!
//! Credentials are never compiled in. The binary fills these from CLI flags,
//! the environment and an optional `.env` file.

use crate::error::{DirectoryError, DirectoryResult};

/// Default PostgreSQL port.
pub const DEFAULT_PG_PORT: u16 = 5432;

/// Where the phonebook lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// PostgreSQL reached through a full connection URL.
    PostgresUrl { url: String },
    /// PostgreSQL reached through individual parameters.
    Postgres {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        database: String,
    },
    /// SQLite database file or `sqlite::memory:` URL.
    Sqlite { url: String },
}

/// Raw, possibly incomplete connection settings.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl ConnectionSettings {
    /// Resolve into a [`DatabaseConfig`]. A URL takes precedence over the
    /// individual parameters.
    pub fn resolve(self) -> DirectoryResult<DatabaseConfig> {
        if let Some(url) = self.database_url.filter(|url| !url.trim().is_empty()) {
            return DatabaseConfig::from_url(url);
        }

        match (self.host, self.database) {
            (Some(host), Some(database)) => Ok(DatabaseConfig::Postgres {
                host,
                port: self.port.unwrap_or(DEFAULT_PG_PORT),
                username: self.username,
                password: self.password,
                database,
            }),
            _ => Err(DirectoryError::Config(
                "set DATABASE_URL, or both a host and a database name".to_string(),
            )),
        }
    }
}

impl DatabaseConfig {
    /// Pick the backend from the URL scheme.
    pub fn from_url(url: String) -> DirectoryResult<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DatabaseConfig::PostgresUrl { url })
        } else if url.starts_with("sqlite:") {
            Ok(DatabaseConfig::Sqlite { url })
        } else {
            Err(DirectoryError::Config(format!(
                "unsupported database URL scheme: {}",
                url.split(':').next().unwrap_or_default()
            )))
        }
    }

    /// Short backend name for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            DatabaseConfig::PostgresUrl { .. } | DatabaseConfig::Postgres { .. } => "postgres",
            DatabaseConfig::Sqlite { .. } => "sqlite",
        }
    }
}
