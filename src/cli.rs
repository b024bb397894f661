//! Command-line interface for tictactoe_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// N-in-a-row game server with versioned, idempotent moves
#[derive(Parser, Debug)]
#[command(name = "tictactoe_server")]
#[command(about = "Turn-based N-in-a-row game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "tictactoe.toml")]
    pub config: PathBuf,

    /// Override the database path from the configuration
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Seed for the random-event roll (reproducible games)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Apply pending database migrations and exit
    Migrate,
}
