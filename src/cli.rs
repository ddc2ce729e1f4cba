//! Command-line interface for tictac_duel.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tictac_duel::ResetAction;

/// Tic-tac-toe duel - session server and client for chat mini-apps
#[derive(Parser, Debug)]
#[command(name = "tictac_duel")]
#[command(about = "Two-player tic-tac-toe sessions over HTTP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP session server
    Serve {
        /// Path to a TOML config file (optional)
        #[arg(short, long, default_value = "tictac_duel.toml")]
        config: PathBuf,

        /// Host to bind to, overrides config and environment
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to, overrides config and environment
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play both sides on this terminal
    Local,

    /// Create a session and print the invite link
    Create {
        /// Session server URL
        #[arg(long, default_value = "http://localhost:8000")]
        server_url: String,

        /// Your user id
        #[arg(long)]
        user_id: String,

        /// Your display name
        #[arg(long)]
        user_name: Option<String>,
    },

    /// Join a session as O
    Join {
        /// Session server URL
        #[arg(long, default_value = "http://localhost:8000")]
        server_url: String,

        /// Session id from the invite link
        #[arg(long)]
        game_id: String,

        /// Your user id
        #[arg(long)]
        user_id: String,

        /// Your display name
        #[arg(long)]
        user_name: Option<String>,
    },

    /// Play a cell
    Move {
        /// Session server URL
        #[arg(long, default_value = "http://localhost:8000")]
        server_url: String,

        /// Session id
        #[arg(long)]
        game_id: String,

        /// Your user id
        #[arg(long)]
        user_id: String,

        /// Cell to play (0-8)
        cell: usize,
    },

    /// Request, accept or reject a rematch
    Reset {
        /// Session server URL
        #[arg(long, default_value = "http://localhost:8000")]
        server_url: String,

        /// Session id
        #[arg(long)]
        game_id: String,

        /// Your user id
        #[arg(long)]
        user_id: String,

        /// request, accept or reject
        action: ResetAction,
    },

    /// Follow a session, printing changes as they arrive
    Watch {
        /// Session server URL
        #[arg(long, default_value = "http://localhost:8000")]
        server_url: String,

        /// Session id
        #[arg(long)]
        game_id: String,

        /// Your user id
        #[arg(long)]
        user_id: String,

        /// Polling interval, defaults to POLL_INTERVAL_MS or 1000
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}
