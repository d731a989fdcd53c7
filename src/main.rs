//! Phonebook console binary.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use phonebook::console::Console;
use phonebook::ConnectionSettings;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Interactive phonebook backed by PostgreSQL or SQLite
#[derive(Parser, Debug)]
#[command(name = "phonebook")]
#[command(version, about, long_about = None)]
struct Args {
    /// Full connection URL (postgres://... or sqlite:...); overrides the individual parameters
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// PostgreSQL host
    #[arg(long, env = "PGHOST")]
    host: Option<String>,

    /// PostgreSQL port
    #[arg(long, env = "PGPORT")]
    port: Option<u16>,

    /// PostgreSQL user
    #[arg(long, env = "PGUSER")]
    user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Database name
    #[arg(long, env = "PGDATABASE")]
    dbname: Option<String>,

    /// Maximum pooled connections
    #[arg(long, env = "PHONEBOOK_MAX_CONNECTIONS", default_value_t = 1)]
    max_connections: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr so they never interleave with the menu on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = ConnectionSettings {
        database_url: args.database_url,
        host: args.host,
        port: args.port,
        username: args.user,
        password: args.password,
        database: args.dbname,
    }
    .resolve()
    .context("Invalid database configuration")?;

    tracing::info!(backend = config.backend(), "Phonebook starting");

    let store = phonebook::connect(&config, args.max_connections)
        .await
        .context("Failed to connect to database")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(store.as_ref(), stdin.lock(), stdout.lock());
    console.run().await.context("Console I/O failed")?;

    Ok(())
}
