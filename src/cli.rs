use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::StorageBackend;

#[derive(Parser, Debug)]
#[command(author, version, about = "Four-player mahjong scorekeeping ledger")]
pub struct Cli {
    /// Storage backend (defaults to MAHJONG_LEDGER_BACKEND or json)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<StorageBackend>,

    /// Data directory for json, database file for sqlite
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Register a new player
    AddPlayer {
        /// Player name
        name: String,
    },
    /// Record a finished game, seats given as NAME=SCORE
    Record {
        /// East seat
        east: String,
        /// South seat
        south: String,
        /// West seat
        west: String,
        /// North seat
        north: String,
    },
    /// Delete a game and withdraw its points
    Delete {
        /// Game id
        id: String,
    },
    /// Re-enter the final scores of a game, in seat order
    Edit {
        /// Game id
        id: String,
        east: String,
        south: String,
        west: String,
        north: String,
    },
    /// Show players ranked by total points
    Leaderboard,
    /// Show recorded games, most recent first
    History {
        /// Show at most this many games
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Compare player statistics with the game log
    Check,
    /// Rebuild player statistics from the game log
    Reconcile,
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
