//! Interactive phonebook menu.
//!
//! Every action runs against the store on its own; a failing action prints
//! its error and the menu keeps going.

use crate::csv_import;
use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{zip_columns, Contact, NewContact};
use crate::store::Directory;
use std::io::{BufRead, Write};
use std::path::Path;

/// A numbered menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateTable,
    ImportCsv,
    InsertOne,
    Update,
    Query,
    Delete,
    InsertMany,
    DeleteByPattern,
    Exit,
}

impl MenuChoice {
    /// Every entry in menu order.
    pub const ALL: [MenuChoice; 9] = [
        MenuChoice::CreateTable,
        MenuChoice::ImportCsv,
        MenuChoice::InsertOne,
        MenuChoice::Update,
        MenuChoice::Query,
        MenuChoice::Delete,
        MenuChoice::InsertMany,
        MenuChoice::DeleteByPattern,
        MenuChoice::Exit,
    ];

    /// Map a typed menu number to its entry; surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::CreateTable),
            "2" => Some(MenuChoice::ImportCsv),
            "3" => Some(MenuChoice::InsertOne),
            "4" => Some(MenuChoice::Update),
            "5" => Some(MenuChoice::Query),
            "6" => Some(MenuChoice::Delete),
            "7" => Some(MenuChoice::InsertMany),
            "8" => Some(MenuChoice::DeleteByPattern),
            "9" => Some(MenuChoice::Exit),
            _ => None,
        }
    }

    /// The number shown for this entry.
    pub fn number(self) -> u8 {
        match self {
            MenuChoice::CreateTable => 1,
            MenuChoice::ImportCsv => 2,
            MenuChoice::InsertOne => 3,
            MenuChoice::Update => 4,
            MenuChoice::Query => 5,
            MenuChoice::Delete => 6,
            MenuChoice::InsertMany => 7,
            MenuChoice::DeleteByPattern => 8,
            MenuChoice::Exit => 9,
        }
    }

    /// Menu text for this entry.
    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::CreateTable => "Create table",
            MenuChoice::ImportCsv => "Insert data from CSV",
            MenuChoice::InsertOne => "Insert data from console",
            MenuChoice::Update => "Update data",
            MenuChoice::Query => "Query data",
            MenuChoice::Delete => "Delete data",
            MenuChoice::InsertMany => "Insert many users from console",
            MenuChoice::DeleteByPattern => "Delete users by pattern",
            MenuChoice::Exit => "Exit",
        }
    }

    /// Phrase used in error messages: "Error {context}: ...".
    fn error_context(self) -> &'static str {
        match self {
            MenuChoice::CreateTable => "creating table",
            MenuChoice::ImportCsv => "inserting data from CSV",
            MenuChoice::InsertOne => "inserting data from console",
            MenuChoice::Update => "updating data",
            MenuChoice::Query => "querying data",
            MenuChoice::Delete | MenuChoice::DeleteByPattern => "deleting data",
            MenuChoice::InsertMany => "inserting many users from console",
            MenuChoice::Exit => "exiting",
        }
    }
}

/// How option 5 selects rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    All,
    Pattern(String),
    Page { limit: u32, offset: u32 },
}

/// Menu loop over a line-oriented input and a text output.
pub struct Console<'a, R, W> {
    store: &'a dyn Directory,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(store: &'a dyn Directory, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Consume the console and return its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user picks Exit or input ends.
    ///
    /// Action errors are printed and the loop continues. Only a failure to
    /// write to the output ends it early.
    pub async fn run(&mut self) -> DirectoryResult<()> {
        loop {
            self.print_menu()?;
            let line = match self.prompt("Enter your choice: ") {
                Ok(line) => line,
                Err(DirectoryError::InputClosed) => {
                    writeln!(self.output)?;
                    return Ok(());
                }
                Err(err) => return Err(err),
            };

            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "Invalid choice. Please try again.")?;
                continue;
            };

            if choice == MenuChoice::Exit {
                writeln!(self.output, "Exiting PhoneBook. Goodbye!")?;
                return Ok(());
            }

            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(DirectoryError::InputClosed) => {
                    tracing::debug!(action = choice.label(), "Input closed mid-action");
                    writeln!(self.output)?;
                    return Ok(());
                }
                Err(err) => {
                    tracing::error!(action = choice.label(), error = %err, "Operation failed");
                    writeln!(self.output, "Error {}: {}", choice.error_context(), err)?;
                }
            }
        }
    }

    fn print_menu(&mut self) -> DirectoryResult<()> {
        writeln!(self.output, "\nPhoneBook Menu:")?;
        for choice in MenuChoice::ALL {
            writeln!(self.output, "{}. {}", choice.number(), choice.label())?;
        }
        Ok(())
    }

    /// Print `label` and read one trimmed line.
    ///
    /// Fails with [`DirectoryError::InputClosed`] once input is exhausted, so
    /// the pending action never runs on a missing answer.
    fn prompt(&mut self, label: &str) -> DirectoryResult<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(DirectoryError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> DirectoryResult<()> {
        match choice {
            MenuChoice::CreateTable => self.create_table().await,
            MenuChoice::ImportCsv => self.import_csv().await,
            MenuChoice::InsertOne => self.insert_one().await,
            MenuChoice::Update => self.update().await,
            MenuChoice::Query => self.query().await,
            MenuChoice::Delete => {
                let query = self.prompt("Enter name or phone to delete: ")?;
                self.delete(&query).await
            }
            MenuChoice::InsertMany => self.insert_many().await,
            MenuChoice::DeleteByPattern => {
                // Same exact phone-or-first-name match as option 6.
                let query = self.prompt("Enter pattern to delete users by: ")?;
                self.delete(&query).await
            }
            MenuChoice::Exit => Ok(()),
        }
    }

    async fn create_table(&mut self) -> DirectoryResult<()> {
        self.store.create_schema().await?;
        writeln!(self.output, "Table created successfully.")?;
        Ok(())
    }

    async fn import_csv(&mut self) -> DirectoryResult<()> {
        let file_name = self.prompt("Enter CSV file name: ")?;
        let written = csv_import::import_file(self.store, Path::new(&file_name)).await?;
        writeln!(
            self.output,
            "Data inserted successfully from CSV! ({written} rows)"
        )?;
        Ok(())
    }

    async fn insert_one(&mut self) -> DirectoryResult<()> {
        let first_name = self.prompt("Enter first name: ")?;
        let last_name = self.prompt("Enter last name: ")?;
        let phone = self.prompt("Enter phone number: ")?;

        if first_name.is_empty() || phone.is_empty() {
            writeln!(self.output, "First name and phone are required!")?;
            return Ok(());
        }

        self.store
            .upsert_contact(&NewContact::new(first_name, last_name, phone))
            .await?;
        writeln!(self.output, "Data inserted/updated successfully!")?;
        Ok(())
    }

    async fn update(&mut self) -> DirectoryResult<()> {
        let phone = self.prompt("Enter the phone number to update: ")?;
        let first_name = self.prompt("Enter new first name (leave blank to keep current): ")?;
        let last_name = self.prompt("Enter new last name (leave blank to keep current): ")?;

        let first_name = (!first_name.is_empty()).then_some(first_name);
        let last_name = (!last_name.is_empty()).then_some(last_name);
        if first_name.is_none() && last_name.is_none() {
            writeln!(self.output, "No changes to update.")?;
            return Ok(());
        }

        let updated = self
            .store
            .update_contact(&phone, first_name.as_deref(), last_name.as_deref())
            .await?;
        if updated {
            writeln!(self.output, "Data updated successfully.")?;
        } else {
            writeln!(self.output, "No contact with phone {phone}.")?;
        }
        Ok(())
    }

    async fn query(&mut self) -> DirectoryResult<()> {
        let mode = self.prompt(
            "Enter 'pattern' to search or 'pagination' for pages (or press Enter for all): ",
        )?;
        let mode = match mode.as_str() {
            "pattern" => QueryMode::Pattern(self.prompt("Enter pattern: ")?),
            "pagination" => {
                let limit = self.prompt_number("Enter limit: ")?;
                let offset = self.prompt_number("Enter offset: ")?;
                QueryMode::Page { limit, offset }
            }
            _ => QueryMode::All,
        };

        let contacts = match &mode {
            QueryMode::All => self.store.list_all().await?,
            QueryMode::Pattern(pattern) => self.store.search_by_pattern(pattern).await?,
            QueryMode::Page { limit, offset } => self.store.list_page(*limit, *offset).await?,
        };
        self.print_contacts(&contacts)
    }

    fn prompt_number(&mut self, label: &str) -> DirectoryResult<u32> {
        let raw = self.prompt(label)?;
        raw.parse::<u32>().map_err(|_| {
            DirectoryError::InvalidInput(format!("expected a non-negative number, got {raw:?}"))
        })
    }

    async fn delete(&mut self, query: &str) -> DirectoryResult<()> {
        let deleted = self.store.delete_by_name_or_phone(query).await?;
        writeln!(self.output, "Deleted {deleted} contact(s).")?;
        Ok(())
    }

    async fn insert_many(&mut self) -> DirectoryResult<()> {
        let names = self.prompt("Enter first names separated by commas: ")?;
        let surnames = self.prompt("Enter last names separated by commas: ")?;
        let phones = self.prompt("Enter phone numbers separated by commas: ")?;

        let names: Vec<&str> = names.split(',').collect();
        let surnames: Vec<&str> = surnames.split(',').collect();
        let phones: Vec<&str> = phones.split(',').collect();
        let entries = zip_columns(&names, &surnames, &phones)?;

        let report = self.store.bulk_upsert_contacts(&entries).await?;
        writeln!(self.output, "Users inserted from console.")?;
        if !report.rejected.is_empty() {
            writeln!(self.output, "Invalid phones: {:?}", report.rejected)?;
        }

        let contacts = self.store.find_by_phones(&report.upserted).await?;
        if contacts.is_empty() {
            writeln!(self.output, "No new users inserted.")?;
        } else {
            writeln!(self.output, "Inserted users:")?;
            for contact in &contacts {
                writeln!(self.output, "{contact}")?;
            }
        }
        Ok(())
    }

    fn print_contacts(&mut self, contacts: &[Contact]) -> DirectoryResult<()> {
        if contacts.is_empty() {
            writeln!(self.output, "No data found.")?;
        }
        for contact in contacts {
            writeln!(self.output, "{contact}")?;
        }
        Ok(())
    }
}
