//! Table definitions for the phonebook store.

/// PostgreSQL DDL. VARCHAR limits enforce the field lengths.
pub const POSTGRES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS phonebook (
    id BIGSERIAL PRIMARY KEY,
    first_name VARCHAR(50) NOT NULL,
    last_name VARCHAR(50),
    phone VARCHAR(20) NOT NULL UNIQUE
)
"#;

/// SQLite DDL. SQLite ignores VARCHAR lengths, so they are CHECK constraints.
pub const SQLITE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS phonebook (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL CHECK (length(first_name) <= 50),
    last_name TEXT CHECK (last_name IS NULL OR length(last_name) <= 50),
    phone TEXT NOT NULL UNIQUE CHECK (length(phone) <= 20)
)
"#;
