//! Command-line interface for arena_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe match server
#[derive(Parser, Debug)]
#[command(name = "arena_server")]
#[command(about = "Two-player tic-tac-toe match server with REST API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Path to server config file
        #[arg(short, long, default_value = "arena.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database path (overrides config)
        #[arg(long)]
        database_url: Option<String>,

        /// Keep everything in memory instead of SQLite
        #[arg(long)]
        memory: bool,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Path to server config file
        #[arg(short, long, default_value = "arena.toml")]
        config: PathBuf,

        /// SQLite database path (overrides config)
        #[arg(long)]
        database_url: Option<String>,
    },
}
