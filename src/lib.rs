//! Phonebook: a contact directory over PostgreSQL or SQLite.
//!
//! This crate provides:
//! - The `Directory` trait: upsert, bulk upsert, pattern search, pagination
//!   and deletion over a single `phonebook` table
//! - PostgreSQL and SQLite implementations
//! - CSV import and the interactive console menu

pub mod config;
pub mod console;
pub mod csv_import;
pub mod error;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;
pub mod validation;

pub use config::{ConnectionSettings, DatabaseConfig};
pub use error::{DirectoryError, DirectoryResult};
pub use models::{zip_columns, BulkReport, Contact, NewContact};
pub use postgres::PostgresDirectory;
pub use store::{Directory, SqliteDirectory};

use std::sync::Arc;

/// Open a directory from configuration.
pub async fn connect(
    config: &DatabaseConfig,
    max_connections: u32,
) -> DirectoryResult<Arc<dyn Directory>> {
    match config {
        DatabaseConfig::PostgresUrl { url } => {
            tracing::info!("Connecting to PostgreSQL using connection URL");
            let store = PostgresDirectory::from_url(url, max_connections).await?;
            Ok(Arc::new(store) as Arc<dyn Directory>)
        }
        DatabaseConfig::Postgres {
            host,
            port,
            username,
            password,
            database,
        } => {
            let store = PostgresDirectory::from_params(
                host,
                *port,
                username.as_deref(),
                password.as_deref(),
                database,
                max_connections,
            )
            .await?;
            Ok(Arc::new(store) as Arc<dyn Directory>)
        }
        DatabaseConfig::Sqlite { url } => {
            let store = SqliteDirectory::from_url(url, max_connections).await?;
            Ok(Arc::new(store) as Arc<dyn Directory>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_sqlite_memory() {
        let config = DatabaseConfig::from_url("sqlite::memory:".to_string()).unwrap();
        let store = connect(&config, 1).await.unwrap();
        store.health_check().await.unwrap();
        store.create_schema().await.unwrap();
        assert_eq!(store.count_contacts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connect_sqlite_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("phonebook.db");
        let config = DatabaseConfig::from_url(format!("sqlite:{}", db_path.display())).unwrap();

        let store = connect(&config, 1).await.unwrap();
        store.create_schema().await.unwrap();
        assert!(db_path.exists());
    }
}
