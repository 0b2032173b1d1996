use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(version, about = "Kanban board service - ordered columns and cards over REST and GraphQL")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to kanban.toml (default: .kanban/kanban.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file. Overrides the config file and KANBAN_DB_PATH.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (REST under /kanban, GraphQL at /graphql)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Allow cross-origin requests from any origin
        #[arg(long)]
        cors: bool,
    },
    /// Create and migrate the board database
    Init,
    /// Print the current board as JSON
    Board,
    /// View, create or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Check the config file for problems
    Validate,
    /// Write a default kanban.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let Cli {
        verbose,
        config,
        db_path,
        command,
    } = Cli::parse();
    let config_path = kanban::config::config_path(config.as_deref());

    match command {
        Commands::Config { command } => cmd::cmd_config(&config_path, command)?,
        Commands::Serve { port, host, cors } => {
            let settings = cmd::prepare(&config_path, db_path.as_deref(), verbose)?;
            cmd::cmd_serve(settings, port, host, cors).await?
        }
        Commands::Init => {
            let settings = cmd::prepare(&config_path, db_path.as_deref(), verbose)?;
            cmd::cmd_init(&settings.database.path)?
        }
        Commands::Board => {
            let settings = cmd::prepare(&config_path, db_path.as_deref(), verbose)?;
            cmd::cmd_board(&settings.database.path)?
        }
    }

    Ok(())
}
