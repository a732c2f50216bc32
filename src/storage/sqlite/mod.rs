pub mod connection;
pub mod games;
pub mod players;
pub mod setup;

use anyhow::{Context, Result};
use log::{info, warn};

pub use connection::{DbConn, DbPool, checkout, open_pool};

use super::{Snapshot, SnapshotStore};
use crate::errors::{load_context, save_context};

/// Snapshot kept in a single SQLite file.
pub struct SqliteStore {
    path: String,
    pool: DbPool,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let pool = open_pool(path)?;
        let conn = checkout(&pool)?;
        setup::ensure_schema(&conn)?;

        Ok(Self {
            path: path.to_string(),
            pool,
        })
    }

    fn read_snapshot(&self) -> Result<Snapshot> {
        let conn = checkout(&self.pool)?;
        Ok(Snapshot {
            players: players::list_all(&conn)?,
            games: games::list_all(&conn)?,
        })
    }

    fn replace_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let mut conn = checkout(&self.pool)?;
        let tx = conn.transaction().context("Failed to begin transaction")?;

        tx.execute("DELETE FROM results", [])?;
        tx.execute("DELETE FROM games", [])?;
        tx.execute("DELETE FROM players", [])?;
        players::insert_all(&tx, &snapshot.players)?;
        games::insert_all(&tx, &snapshot.games)?;

        tx.commit().context("Failed to commit snapshot")
    }
}

impl SnapshotStore for SqliteStore {
    fn load(&self) -> Snapshot {
        match self.read_snapshot().with_context(|| load_context("snapshot", &self.path)) {
            Ok(snapshot) => {
                info!(
                    "Loaded {} players and {} games from {}",
                    snapshot.players.len(),
                    snapshot.games.len(),
                    self.path
                );
                snapshot
            }
            Err(e) => {
                warn!("Starting from an empty ledger: {:#}", e);
                Snapshot::default()
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.replace_snapshot(snapshot)
            .with_context(|| save_context("snapshot", &self.path))
    }

    fn location(&self) -> String {
        self.path.clone()
    }
}
