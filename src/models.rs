//! Row types for the phonebook table.

use crate::error::{DirectoryError, DirectoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: String,
}

impl Contact {
    /// True if `needle`, already lowercased, is a substring of the lowercased
    /// first name, last name or phone.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.first_name.to_lowercase().contains(needle)
            || self
                .last_name
                .as_deref()
                .is_some_and(|last| last.to_lowercase().contains(needle))
            || self.phone.to_lowercase().contains(needle)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.id,
            self.first_name,
            self.last_name.as_deref().unwrap_or("-"),
            self.phone
        )
    }
}

/// Input for an upsert. `phone` is the conflict key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: String,
}

impl NewContact {
    /// Build an entry, storing a blank last name as `None`.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        let last_name = last_name.into();
        Self {
            first_name: first_name.into(),
            last_name: (!last_name.trim().is_empty()).then_some(last_name),
            phone: phone.into(),
        }
    }
}

/// Outcome of a validated bulk upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// Phones that passed validation and were written, in input order.
    pub upserted: Vec<String>,
    /// Phones that failed validation and were not written, in input order.
    /// These are the trimmed strings produced by [`zip_columns`].
    pub rejected: Vec<String>,
}

/// Zip parallel name/surname/phone columns into entries.
///
/// Fails with [`DirectoryError::ShapeMismatch`] unless all three columns have
/// the same length, so a mismatched batch never reaches the store.
pub fn zip_columns<S: AsRef<str>>(
    first_names: &[S],
    last_names: &[S],
    phones: &[S],
) -> DirectoryResult<Vec<NewContact>> {
    if first_names.len() != last_names.len() || first_names.len() != phones.len() {
        return Err(DirectoryError::ShapeMismatch {
            first_names: first_names.len(),
            last_names: last_names.len(),
            phones: phones.len(),
        });
    }

    Ok(first_names
        .iter()
        .zip(last_names)
        .zip(phones)
        .map(|((first, last), phone)| {
            NewContact::new(
                first.as_ref().trim(),
                last.as_ref().trim(),
                phone.as_ref().trim(),
            )
        })
        .collect())
}
