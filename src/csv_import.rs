//! CSV contact import.
//!
//! The first row is a header and is skipped. Each data row is
//! `first_name,last_name,phone`; shorter rows are ignored and fields past the
//! third are dropped.

use crate::error::DirectoryResult;
use crate::models::NewContact;
use crate::store::Directory;
use std::io::Read;
use std::path::Path;

/// Parse contact rows from a CSV reader.
pub fn read_contacts<R: Read>(reader: R) -> DirectoryResult<Vec<NewContact>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() < 3 {
            continue;
        }
        let fields: csv::StringRecord = record.iter().take(3).collect();
        let row: NewContact = fields.deserialize(None)?;
        entries.push(NewContact::new(
            row.first_name,
            row.last_name.unwrap_or_default(),
            row.phone,
        ));
    }
    Ok(entries)
}

/// Import a CSV file in one transaction. Returns the number of rows written.
pub async fn import_file(store: &dyn Directory, path: &Path) -> DirectoryResult<u64> {
    let file = std::fs::File::open(path)?;
    let entries = read_contacts(file)?;
    let written = store.upsert_contacts(&entries).await?;
    tracing::info!(path = %path.display(), rows = written, "CSV import finished");
    Ok(written)
}
