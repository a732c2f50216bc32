use anyhow::{Context, Result, bail};
use log::info;

use super::report;
use crate::config::{AppConfig, DisplaySettings, StorageBackend, StorageSettings};
use crate::engine::{LedgerEngine, SeatEntry};
use crate::storage::{JsonStore, SnapshotStore, SqliteStore};

/// Runs CLI commands against a ledger engine and renders their output.
pub struct LedgerService {
    engine: LedgerEngine,
    display: DisplaySettings,
}

pub fn open_store(settings: &StorageSettings) -> Result<Box<dyn SnapshotStore>> {
    let location = settings.path.display().to_string();
    info!("Using {:?} storage at {}", settings.backend, location);

    Ok(match settings.backend {
        StorageBackend::Json => Box::new(
            JsonStore::new(&settings.path)
                .with_context(|| format!("Failed to open data directory {location}"))?,
        ),
        StorageBackend::Sqlite => Box::new(
            SqliteStore::open(&location)
                .with_context(|| format!("Failed to open database {location}"))?,
        ),
    })
}

/// Splits a `NAME=SCORE` argument. The last `=` separates the score so names
/// may contain one.
pub fn parse_seat_arg(arg: &str) -> SeatEntry {
    match arg.rsplit_once('=') {
        Some((name, score)) => SeatEntry::new(name, score),
        None => SeatEntry {
            player: Some(arg.to_string()),
            final_score: None,
        },
    }
}

impl LedgerService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = open_store(&config.storage)?;
        Ok(Self::with_engine(LedgerEngine::open(store), config.display))
    }

    pub fn with_engine(engine: LedgerEngine, display: DisplaySettings) -> Self {
        Self { engine, display }
    }

    pub fn engine(&self) -> &LedgerEngine {
        &self.engine
    }

    pub fn add_player(&mut self, name: &str) -> Result<String> {
        let player = self.engine.add_player(name)?;
        Ok(format!("Added {} ({})", player.name, player.id))
    }

    /// Seats in East, South, West, North order, each `NAME=SCORE`.
    pub fn record(&mut self, seats: [&str; 4]) -> Result<String> {
        if !self.engine.ready_for_game() {
            bail!(
                "Need at least 4 players to record a game ({} registered)",
                self.engine.players().len()
            );
        }

        let entries = seats.map(parse_seat_arg);
        for name in entries.iter().filter_map(|e| e.player.as_deref()) {
            if !name.trim().is_empty() && self.engine.player(name).is_none() {
                bail!("{} is not a registered player", name.trim());
            }
        }

        let game = self.engine.record_game(entries)?;
        let number = self.engine.game_number(&game.id).unwrap_or(1);
        Ok(report::game(number, &game, &self.display))
    }

    pub fn delete(&mut self, game_id: &str) -> Result<String> {
        self.engine.delete_game(game_id)?;
        Ok(format!("Deleted game {game_id}"))
    }

    /// Re-enters a game's scores. Rejected input leaves the game as it was.
    pub fn edit(&mut self, game_id: &str, scores: [&str; 4]) -> Result<String> {
        let session = self.engine.begin_edit(game_id)?;
        info!(
            "Previous scores: {}",
            session
                .seats
                .iter()
                .map(|s| format!("{} {}={}", s.seat.glyph(), s.player, s.final_score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let game = self.engine.commit_edit(game_id, scores)?;
        let number = self.engine.game_number(&game.id).unwrap_or(1);
        Ok(report::game(number, &game, &self.display))
    }

    pub fn leaderboard(&self) -> String {
        report::leaderboard(&self.engine.leaderboard(), &self.display)
    }

    pub fn history(&self, limit: Option<usize>) -> String {
        report::history(self.engine.history(), limit, &self.display)
    }

    pub fn check(&self) -> Result<String> {
        let report = self.engine.check()?;
        Ok(report::reconcile(&report, false, &self.display))
    }

    pub fn reconcile(&mut self) -> Result<String> {
        let report = self.engine.reconcile()?;
        Ok(report::reconcile(&report, true, &self.display))
    }
}
