//! Directory error types.

use thiserror::Error;

/// Directory operation errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error(
        "all arrays must have the same length (first names: {first_names}, last names: {last_names}, phones: {phones})"
    )]
    ShapeMismatch {
        first_names: usize,
        last_names: usize,
        phones: usize,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Console input ended while a prompt was waiting.
    #[error("input closed")]
    InputClosed,
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if is_constraint_violation(&**db_err) {
                return DirectoryError::Constraint(db_err.message().to_string());
            }
        }
        DirectoryError::Database(err)
    }
}

fn is_constraint_violation(db_err: &(dyn sqlx::error::DatabaseError + 'static)) -> bool {
    use sqlx::error::ErrorKind;

    match db_err.kind() {
        ErrorKind::UniqueViolation
        | ErrorKind::ForeignKeyViolation
        | ErrorKind::NotNullViolation
        | ErrorKind::CheckViolation => true,
        _ => {
            let code = db_err.code();
            let code = code.as_deref();
            // 22001: value too long for type character varying(n)
            if code == Some("22001") {
                return true;
            }
            // SQLite reports extended codes; the primary code is the low byte
            // and SQLITE_CONSTRAINT is 19.
            db_err
                .try_downcast_ref::<sqlx::sqlite::SqliteError>()
                .is_some()
                && code
                    .and_then(|code| code.parse::<i32>().ok())
                    .is_some_and(|code| code & 0xff == 19)
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message_lists_lengths() {
        let err = DirectoryError::ShapeMismatch {
            first_names: 3,
            last_names: 2,
            phones: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("same length"));
        assert!(msg.contains("last names: 2"));
    }

    #[test]
    fn test_non_database_sqlx_error_stays_database() {
        let err: DirectoryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DirectoryError::Database(_)));
    }
}
