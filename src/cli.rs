//! Command-line interface for tictactoe_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe against a random computer opponent
#[derive(Parser, Debug)]
#[command(name = "tictactoe_server")]
#[command(about = "Play tic-tac-toe against a random computer over HTTP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides config and DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed for the computer opponent (reproducible games)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Create a user and print their API token
    CreateUser {
        /// Unique username
        username: String,
    },

    /// Apply pending database migrations
    Migrate,
}
