//! Shared test utilities.

#![allow(dead_code)]

use phonebook::{Directory, DirectoryResult, NewContact, SqliteDirectory};

/// Environment variable holding a PostgreSQL URL for the PostgreSQL suite.
pub const POSTGRES_URL_ENV: &str = "PHONEBOOK_TEST_POSTGRES_URL";

/// Fresh in-memory SQLite directory with the table created.
pub async fn sqlite_directory() -> DirectoryResult<SqliteDirectory> {
    let store = SqliteDirectory::in_memory().await?;
    store.create_schema().await?;
    Ok(store)
}

/// Five contacts inserted in order, so ids ascend with the index.
pub fn five_contacts() -> Vec<NewContact> {
    vec![
        NewContact::new("Ann", "Lee", "+19995551234"),
        NewContact::new("John", "Smith", "5551230001"),
        NewContact::new("Smithers", "Burns", "5551230002"),
        NewContact::new("Kate", "", "5551230003"),
        NewContact::new("Mark", "Goldsmith", "5551230004"),
    ]
}

pub async fn seed(store: &dyn Directory, entries: &[NewContact]) -> DirectoryResult<()> {
    for entry in entries {
        store.upsert_contact(entry).await?;
    }
    Ok(())
}
