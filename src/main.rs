//! todo-api CLI - serve the todo HTTP API or initialize a project

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use todo_api::config::{self, Settings, TodoConfig};
use todo_api::storage::SqliteStore;
use todo_api::ui;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "todo-api")]
#[command(version)]
#[command(about = "Todo CRUD service backed by a single SQLite file")]
#[command(long_about = r#"
Serves a small JSON API for todo records. All data lives in one SQLite
file that is rewritten after every change.

Example usage:
  todo-api init
  todo-api serve --port 3000
  curl -X POST localhost:3000/todos -H 'content-type: application/json' -d '{"title":"Buy milk"}'
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./todo.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind
        #[arg(short = 'H', long, env = "HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Path to the database file
        #[arg(short, long, env = "TODO_DATABASE")]
        database: Option<PathBuf>,
    },

    /// Write a default config file and create the database
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        database: None,
    });

    match command {
        Commands::Serve { host, port, database } => {
            let file = config::load_config(cli.config.as_deref())?;
            let settings = Settings::resolve(host, port, database, file);
            tracing::info!("Serving {:?} on {}:{}", settings.database, settings.host, settings.port);

            if let Err(e) =
                todo_api::server::start_server(&settings.host, settings.port, settings.database).await
            {
                ui::error(&format!("Server failed: {e}"));
                return Err(e);
            }
        }

        Commands::Init { database, force } => {
            let config_path = cli.config.unwrap_or_else(config::default_config_path);
            let database = database.unwrap_or_else(|| PathBuf::from(config::DEFAULT_DATABASE));

            config::write_config(&config_path, &TodoConfig::with_defaults(&database), force)?;

            let store = SqliteStore::open(&database);
            store.acquire()?;
            store.persist()?;
            let todos = store.count()?;
            store.close()?;

            ui::success("Initialized todo-api");
            ui::info("Config", &config_path.display().to_string());
            ui::info("Database", &database.display().to_string());
            ui::info("Todos", &todos.to_string());
        }
    }

    Ok(())
}
