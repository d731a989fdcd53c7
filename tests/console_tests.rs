//! Menu-driven tests for the interactive console.

mod common;

use common::{five_contacts, seed, sqlite_directory};
use phonebook::console::Console;
use phonebook::{Directory, NewContact, SqliteDirectory};
use std::io::{Cursor, Write};

/// Feed `script` to the menu and return everything it printed.
async fn run_script(store: &SqliteDirectory, script: &str) -> String {
    let mut console = Console::new(store, Cursor::new(script.to_string()), Vec::new());
    console.run().await.expect("console run failed");
    String::from_utf8(console.into_output()).expect("output is utf-8")
}

#[tokio::test]
async fn test_create_table_and_exit() {
    let store = SqliteDirectory::in_memory().await.unwrap();
    let output = run_script(&store, "1\n9\n").await;

    assert!(output.contains("PhoneBook Menu:"));
    assert!(output.contains("8. Delete users by pattern"));
    assert!(output.contains("Table created successfully."));
    assert!(output.contains("Exiting PhoneBook. Goodbye!"));
    assert_eq!(store.count_contacts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_end_of_input_exits_cleanly() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "").await;
    assert!(output.contains("Enter your choice: "));
    assert!(!output.contains("Goodbye"));
}

#[tokio::test]
async fn test_invalid_choice_keeps_menu_running() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "42\n9\n").await;
    assert!(output.contains("Invalid choice. Please try again."));
    assert!(output.contains("Goodbye"));
}

#[tokio::test]
async fn test_insert_requires_first_name_and_phone() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "3\n\nLee\n1234567890\n9\n").await;
    assert!(output.contains("First name and phone are required!"));
    assert_eq!(store.count_contacts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_then_query_all() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "3\nAnn\nLee\n+19995551234\n5\n\n9\n").await;

    assert!(output.contains("Data inserted/updated successfully!"));
    assert!(output.contains("(1, Ann, Lee, +19995551234)"));
}

#[tokio::test]
async fn test_failed_operation_returns_to_menu() {
    // No table yet: the query fails, the menu reports it and keeps going.
    let store = SqliteDirectory::in_memory().await.unwrap();
    let output = run_script(&store, "5\n\n1\n9\n").await;

    assert!(output.contains("Error querying data:"));
    assert!(output.contains("Table created successfully."));
    assert!(output.contains("Goodbye"));
}

#[tokio::test]
async fn test_query_pattern_and_pagination() {
    let store = sqlite_directory().await.unwrap();
    seed(&store, &five_contacts()).await.unwrap();

    let output = run_script(&store, "5\npattern\nsmith\n9\n").await;
    assert!(output.contains("John, Smith"));
    assert!(output.contains("Smithers, Burns"));
    assert!(!output.contains("Ann, Lee"));

    let output = run_script(&store, "5\npagination\n2\n1\n9\n").await;
    assert!(output.contains("(2, John, Smith, 5551230001)"));
    assert!(output.contains("(3, Smithers, Burns, 5551230002)"));
    assert!(!output.contains("(1, Ann"));
    assert!(!output.contains("(4, Kate"));

    let output = run_script(&store, "5\npattern\nnobody\n9\n").await;
    assert!(output.contains("No data found."));
}

#[tokio::test]
async fn test_pagination_rejects_non_numbers() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "5\npagination\nten\n0\n9\n").await;
    assert!(output.contains("Error querying data: invalid input"));
    assert!(output.contains("Goodbye"));
}

#[tokio::test]
async fn test_update_keeps_blank_fields() {
    let store = sqlite_directory().await.unwrap();
    seed(&store, &five_contacts()).await.unwrap();

    let output = run_script(&store, "4\n5551230001\nJohnny\n\n9\n").await;
    assert!(output.contains("Data updated successfully."));
    let found = store.find_by_phones(&["5551230001".to_string()]).await.unwrap();
    assert_eq!(found[0].first_name, "Johnny");
    assert_eq!(found[0].last_name.as_deref(), Some("Smith"));

    let output = run_script(&store, "4\n5551230001\n\n\n9\n").await;
    assert!(output.contains("No changes to update."));

    let output = run_script(&store, "4\n0000000000\nNew\n\n9\n").await;
    assert!(output.contains("No contact with phone 0000000000."));
    assert_eq!(store.count_contacts().await.unwrap(), 5);
}

#[tokio::test]
async fn test_delete_options_use_exact_match() {
    let store = sqlite_directory().await.unwrap();
    seed(&store, &five_contacts()).await.unwrap();

    let output = run_script(&store, "6\n5551230001\n8\nSmi\n8\nKate\n9\n").await;
    assert!(output.contains("Deleted 1 contact(s)."));
    assert!(output.contains("Deleted 0 contact(s)."));
    assert_eq!(store.count_contacts().await.unwrap(), 3);
}

#[tokio::test]
async fn test_insert_many_reports_invalid_phones() {
    let store = sqlite_directory().await.unwrap();
    let script = "7\nAnn, Bob,Cid\nLee,Ray,Fox\n+19995551234,123,2345678901\n9\n";
    let output = run_script(&store, script).await;

    assert!(output.contains("Users inserted from console."));
    assert!(output.contains("Invalid phones: [\"123\"]"));
    assert!(output.contains("Inserted users:"));
    assert!(output.contains("Ann, Lee, +19995551234"));
    assert!(output.contains("Cid, Fox, 2345678901"));
    assert_eq!(store.count_contacts().await.unwrap(), 2);
}

#[tokio::test]
async fn test_insert_many_unequal_lengths_writes_nothing() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "7\nAnn,Bob\nLee\n1234567890,2345678901\n9\n").await;

    assert!(output.contains("Error inserting many users from console:"));
    assert!(output.contains("same length"));
    assert_eq!(store.count_contacts().await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_many_all_invalid() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "7\nAnn\nLee\nnope\n9\n").await;
    assert!(output.contains("No new users inserted."));
}

#[tokio::test]
async fn test_csv_import_from_menu() {
    let store = sqlite_directory().await.unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "first_name,last_name,phone").unwrap();
    writeln!(file, "Ann,Lee,+19995551234").unwrap();
    file.flush().unwrap();

    let script = format!("2\n{}\n2\n/nonexistent/file.csv\n9\n", file.path().display());
    let output = run_script(&store, &script).await;

    assert!(output.contains("Data inserted successfully from CSV! (1 rows)"));
    assert!(output.contains("Error inserting data from CSV:"));
    assert_eq!(store.count_contacts().await.unwrap(), 1);
}

#[tokio::test]
async fn test_input_closed_at_prompt_cancels_delete() {
    let store = sqlite_directory().await.unwrap();
    store
        .upsert_contact(&NewContact::new("", "Lee", "1234567890"))
        .await
        .unwrap();

    for script in ["6\n", "8\n"] {
        let output = run_script(&store, script).await;
        assert!(!output.contains("Deleted"));
        assert!(!output.contains("Error"));
        assert_eq!(store.count_contacts().await.unwrap(), 1);
    }
}

#[tokio::test]
async fn test_input_closed_mid_insert_writes_nothing() {
    let store = sqlite_directory().await.unwrap();
    let output = run_script(&store, "3\nAnn\nLee\n").await;

    assert!(output.contains("Enter phone number: "));
    assert!(!output.contains("First name and phone are required!"));
    assert_eq!(store.count_contacts().await.unwrap(), 0);
}
