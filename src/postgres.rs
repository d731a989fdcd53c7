//! PostgreSQL-based directory implementation.

use crate::error::DirectoryResult;
use crate::models::{Contact, NewContact};
use crate::schema::POSTGRES_SCHEMA;
use crate::store::{require_update_fields, Directory};
use crate::validation::escape_like;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, Pool, Postgres};
use std::str::FromStr;

const SELECT_CONTACT: &str = "SELECT id, first_name, last_name, phone FROM phonebook";

/// PostgreSQL-based directory.
pub struct PostgresDirectory {
    pool: Pool<Postgres>,
}

impl PostgresDirectory {
    /// Connect using a full connection URL.
    pub async fn from_url(url: &str, max_connections: u32) -> DirectoryResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections).await
    }

    /// Connect using individual connection parameters.
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        max_connections: u32,
    ) -> DirectoryResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            "Connecting to PostgreSQL"
        );

        Self::connect(opts, max_connections).await
    }

    /// Connections are opened on first use, so an unreachable server fails
    /// the operation that needs it rather than startup.
    async fn connect(opts: PgConnectOptions, max_connections: u32) -> DirectoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_lazy_with(opts);
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

async fn upsert_on(conn: &mut PgConnection, entry: &NewContact) -> DirectoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO phonebook (first_name, last_name, phone)
        VALUES ($1, $2, $3)
        ON CONFLICT (phone) DO UPDATE
        SET first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name
        "#,
    )
    .bind(&entry.first_name)
    .bind(&entry.last_name)
    .bind(&entry.phone)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl Directory for PostgresDirectory {
    async fn create_schema(&self) -> DirectoryResult<()> {
        sqlx::query(POSTGRES_SCHEMA).execute(&self.pool).await?;
        tracing::info!("Phonebook table ready");
        Ok(())
    }

    async fn health_check(&self) -> DirectoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_contact(&self, entry: &NewContact) -> DirectoryResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_on(&mut conn, entry).await?;
        tracing::info!(phone = %entry.phone, "Contact upserted");
        Ok(())
    }

    async fn upsert_contacts(&self, entries: &[NewContact]) -> DirectoryResult<u64> {
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            upsert_on(&mut tx, entry).await?;
        }
        tx.commit().await?;
        tracing::debug!(count = entries.len(), "Contacts upserted");
        Ok(entries.len() as u64)
    }

    async fn update_contact(
        &self,
        phone: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> DirectoryResult<bool> {
        require_update_fields(first_name, last_name)?;
        let result = sqlx::query(
            r#"
            UPDATE phonebook
            SET first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name)
            WHERE phone = $3
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        tracing::info!(phone = %phone, updated, "Contact update");
        Ok(updated)
    }

    async fn search_by_pattern(&self, pattern: &str) -> DirectoryResult<Vec<Contact>> {
        let like = format!("%{}%", escape_like(pattern));
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            r#"{SELECT_CONTACT}
            WHERE first_name ILIKE $1 ESCAPE '\'
               OR last_name ILIKE $1 ESCAPE '\'
               OR phone ILIKE $1 ESCAPE '\'
            ORDER BY id"#
        ))
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;
        tracing::debug!(pattern = %pattern, matches = contacts.len(), "Pattern search");
        Ok(contacts)
    }

    async fn list_page(&self, limit: u32, offset: u32) -> DirectoryResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "{SELECT_CONTACT} ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    async fn list_all(&self) -> DirectoryResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!("{SELECT_CONTACT} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    async fn find_by_phones(&self, phones: &[String]) -> DirectoryResult<Vec<Contact>> {
        if phones.is_empty() {
            return Ok(Vec::new());
        }
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "{SELECT_CONTACT} WHERE phone = ANY($1) ORDER BY id"
        ))
        .bind(phones)
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    async fn delete_by_name_or_phone(&self, query: &str) -> DirectoryResult<u64> {
        let result = sqlx::query("DELETE FROM phonebook WHERE phone = $1 OR first_name = $1")
            .bind(query)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected();
        tracing::info!(query = %query, deleted, "Contacts deleted");
        Ok(deleted)
    }

    async fn count_contacts(&self) -> DirectoryResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM phonebook")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
