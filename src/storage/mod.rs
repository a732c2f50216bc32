pub mod json;
pub mod memory;
pub mod sqlite;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{Game, Player};

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Flat copy of both collections, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub games: Vec<Game>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.games.is_empty()
    }
}

/// Persistence boundary for the ledger engine.
pub trait SnapshotStore {
    /// Missing or unreadable data loads as empty collections.
    fn load(&self) -> Snapshot;

    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}
