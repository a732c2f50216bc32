use thiserror::Error;

use crate::domain::Seat;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Broad class of a ledger failure, for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was changed.
    UserInput,
    /// Caller is out of sync with engine state; nothing was changed.
    State,
    /// The change happened in memory but was not persisted.
    Storage,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("player name must not be empty")]
    EmptyName,

    #[error("player {name} is already taken")]
    DuplicatePlayer { name: String },

    #[error("all four seats must be filled ({filled}/4 selected)")]
    IncompleteSelection { filled: usize },

    #[error("invalid score for {seat} {player}: {input:?}")]
    InvalidScore {
        seat: Seat,
        player: String,
        input: String,
    },

    #[error("game {game_id} not found")]
    NotFound { game_id: String },

    #[error("game {game_id} is already being edited")]
    AlreadyEditing { game_id: String },

    #[error("game {game_id} is not being edited")]
    NotEditing { game_id: String },

    #[error("statistics for {player} do not match the recorded games")]
    CorruptStats { player: String },

    #[error("ledger changes were not saved: {0:#}")]
    Storage(anyhow::Error),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::EmptyName
            | LedgerError::DuplicatePlayer { .. }
            | LedgerError::IncompleteSelection { .. }
            | LedgerError::InvalidScore { .. } => ErrorKind::UserInput,
            LedgerError::NotFound { .. }
            | LedgerError::AlreadyEditing { .. }
            | LedgerError::NotEditing { .. }
            | LedgerError::CorruptStats { .. } => ErrorKind::State,
            LedgerError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Add context to snapshot read errors
pub fn load_context(collection: &str, location: &str) -> String {
    format!("Failed to load {} from: {}", collection, location)
}

/// Add context to snapshot write errors
pub fn save_context(collection: &str, location: &str) -> String {
    format!("Failed to save {} to: {}", collection, location)
}
