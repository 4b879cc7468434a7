//! Microblog CLI - serve the users/posts API and inspect the database

use clap::{Parser, Subcommand};
use microblog::config;
use microblog::storage::SqliteStore;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "microblog")]
#[command(version = "0.1.0")]
#[command(about = "Typed query/mutation API over users and posts, backed by SQLite")]
#[command(long_about = r#"
Microblog stores users and their posts in SQLite and serves a JSON API
over them:
  • CRUD for both record types
  • Partial updates that distinguish omitted, empty, and null fields
  • Cascading user deletion (a user's posts go with it, atomically)
  • On-demand relation lookup (a user's posts, a post's author)

Example usage:
  microblog init
  microblog serve --port 4000
  microblog stats
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file (overrides the config file)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a starter config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show row counts for the database
    Stats {
        /// Path to the database file (overrides the config file)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Serve { port, database, config: config_path } => {
            let loaded = config::load_config(config_path.as_deref())?;
            let database = config::resolve_database_path(database, loaded.as_ref());
            let port = config::resolve_port(port, loaded.as_ref());
            config::ensure_db_dir(&database)?;

            tracing::info!("Serving {} on port {}", database.display(), port);
            microblog::server::start_server(port, database).await?;
        }

        Commands::Init { force } => {
            let config_path = config::default_config_path();
            let database = config::default_database_path_in(std::path::Path::new("."));
            let starter = config::MicroblogConfig {
                database: Some(database.display().to_string()),
                port: Some(config::DEFAULT_PORT),
            };

            config::write_config(&config_path, &starter, force)?;
            config::ensure_db_dir(&database)?;
            let store = SqliteStore::open(&database)?;
            let stats = store.stats()?;

            println!("Created {}", config_path.display());
            println!("Database ready at {} ({})", database.display(), stats);
        }

        Commands::Stats { database, config: config_path } => {
            let loaded = config::load_config(config_path.as_deref())?;
            let database = config::resolve_database_path(database, loaded.as_ref());
            let store = SqliteStore::open(&database)?;
            let stats = store.stats()?;

            println!("Microblog statistics ({})", database.display());
            println!("{}", stats);
        }
    }

    Ok(())
}
