//! Directory trait and the SQLite implementation.

use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{BulkReport, Contact, NewContact};
use crate::schema::SQLITE_SCHEMA;
use crate::validation::is_valid_phone;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Operations over the phonebook table.
///
/// Every call borrows a connection from the store's pool for its own
/// duration; nothing is held between calls.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Create the phonebook table if it does not exist.
    async fn create_schema(&self) -> DirectoryResult<()>;

    /// Check database connectivity.
    async fn health_check(&self) -> DirectoryResult<()>;

    /// Insert a contact, or overwrite the names of the contact with the same phone.
    async fn upsert_contact(&self, entry: &NewContact) -> DirectoryResult<()>;

    /// Upsert every entry in one transaction, without phone validation.
    /// Returns the number of entries written.
    async fn upsert_contacts(&self, entries: &[NewContact]) -> DirectoryResult<u64>;

    /// Overwrite the given name fields of the contact with `phone`.
    ///
    /// `None` keeps the stored value. Returns false if no contact has that
    /// phone; nothing is inserted in that case.
    async fn update_contact(
        &self,
        phone: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> DirectoryResult<bool>;

    /// Contacts whose first name, last name or phone contains `pattern`,
    /// ignoring case.
    async fn search_by_pattern(&self, pattern: &str) -> DirectoryResult<Vec<Contact>>;

    /// At most `limit` contacts in ascending id order, after skipping `offset`.
    async fn list_page(&self, limit: u32, offset: u32) -> DirectoryResult<Vec<Contact>>;

    /// All contacts in ascending id order.
    async fn list_all(&self) -> DirectoryResult<Vec<Contact>>;

    /// Contacts whose phone is one of `phones`.
    async fn find_by_phones(&self, phones: &[String]) -> DirectoryResult<Vec<Contact>>;

    /// Delete contacts whose phone or first name equals `query` exactly.
    /// Returns the number of deleted rows.
    async fn delete_by_name_or_phone(&self, query: &str) -> DirectoryResult<u64>;

    /// Number of stored contacts.
    async fn count_contacts(&self) -> DirectoryResult<i64>;

    /// Upsert the entries whose phone is valid and report the rest.
    ///
    /// Valid entries are written in one transaction. Invalid phones are never
    /// written and do not fail the batch.
    async fn bulk_upsert_contacts(&self, entries: &[NewContact]) -> DirectoryResult<BulkReport> {
        let (valid, invalid): (Vec<NewContact>, Vec<NewContact>) = entries
            .iter()
            .cloned()
            .partition(|entry| is_valid_phone(&entry.phone));

        self.upsert_contacts(&valid).await?;

        let report = BulkReport {
            upserted: valid.into_iter().map(|entry| entry.phone).collect(),
            rejected: invalid.into_iter().map(|entry| entry.phone).collect(),
        };
        if !report.rejected.is_empty() {
            tracing::warn!(rejected = ?report.rejected, "Invalid phones skipped in bulk upsert");
        }
        tracing::info!(
            upserted = report.upserted.len(),
            rejected = report.rejected.len(),
            "Bulk upsert finished"
        );
        Ok(report)
    }
}

/// Reject an update that would change nothing.
pub(crate) fn require_update_fields(
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> DirectoryResult<()> {
    if first_name.is_none() && last_name.is_none() {
        return Err(DirectoryError::InvalidInput(
            "no fields to update".to_string(),
        ));
    }
    Ok(())
}

/// SQLite-based directory.
pub struct SqliteDirectory {
    pool: Pool<Sqlite>,
}

impl SqliteDirectory {
    /// Open (creating if missing) a database file.
    pub async fn new(path: impl AsRef<Path>, max_connections: u32) -> DirectoryResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(opts)
            .await?;

        tracing::debug!(path = %path.display(), "Opened SQLite directory");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// each SQLite in-memory connection is its own database.
    pub async fn in_memory() -> DirectoryResult<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    /// Open from a `sqlite:` URL. `sqlite::memory:` opens an in-memory database.
    pub async fn from_url(url: &str, max_connections: u32) -> DirectoryResult<Self> {
        if url.trim_start_matches("sqlite:").starts_with(":memory:") {
            return Self::in_memory().await;
        }
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

const SELECT_CONTACT: &str = "SELECT id, first_name, last_name, phone FROM phonebook";

async fn upsert_on(conn: &mut SqliteConnection, entry: &NewContact) -> DirectoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO phonebook (first_name, last_name, phone)
        VALUES (?, ?, ?)
        ON CONFLICT(phone) DO UPDATE
        SET first_name = excluded.first_name,
            last_name = excluded.last_name
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
impl Directory for SqliteDirectory {
    async fn create_schema(&self) -> DirectoryResult<()> {
        sqlx::query(SQLITE_SCHEMA).execute(&self.pool).await?;
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
            SET first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name)
            WHERE phone = ?
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
        // SQLite's LIKE folds ASCII only; match on Unicode-lowercased text instead.
        let needle = pattern.to_lowercase();
        let contacts: Vec<Contact> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|contact| contact.matches_lowercase(&needle))
            .collect();
        tracing::debug!(pattern = %pattern, matches = contacts.len(), "Pattern search");
        Ok(contacts)
    }

    async fn list_page(&self, limit: u32, offset: u32) -> DirectoryResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "{SELECT_CONTACT} ORDER BY id LIMIT ? OFFSET ?"
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
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("{SELECT_CONTACT} WHERE phone IN ("));
        let mut separated = builder.separated(", ");
        for phone in phones {
            separated.push_bind(phone);
        }
        separated.push_unseparated(") ORDER BY id");

        let contacts = builder
            .build_query_as::<Contact>()
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    async fn delete_by_name_or_phone(&self, query: &str) -> DirectoryResult<u64> {
        let result = sqlx::query("DELETE FROM phonebook WHERE phone = ? OR first_name = ?")
            .bind(query)
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
