//! Ledger engine: owns the player registry and the game ledger and keeps
//! player aggregates in step with the recorded games.
//!
//! A game is either applied (its deltas are counted in the aggregates) or
//! detached while it is being edited. At most one game is detached at a time.

mod input;
mod reconcile;

use chrono::{DateTime, Utc};
use log::{info, warn};

pub use input::{SeatEntry, parse_final_score};
pub use reconcile::{ReconcileReport, StatsDrift};

use crate::domain::{self, Game, Player, Seat, SeatResult};
use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::GameLedger;
use crate::registry::{PlayerRegistry, Sign};
use crate::scoring;
use crate::storage::{Snapshot, SnapshotStore};

/// Pre-edit values of a game, in seat order.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub game_id: String,
    pub date: DateTime<Utc>,
    pub seats: Vec<EditSeat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSeat {
    pub seat: Seat,
    pub player: String,
    pub final_score: f64,
}

impl EditSession {
    fn from_game(game: &Game) -> Self {
        Self {
            game_id: game.id.clone(),
            date: game.date,
            seats: game
                .results_by_seat()
                .into_iter()
                .map(|r| EditSeat {
                    seat: r.position,
                    player: r.name.clone(),
                    final_score: r.final_score,
                })
                .collect(),
        }
    }
}

/// The game currently detached, with copies of its players taken just before
/// and just after the withdrawal.
struct PendingEdit {
    game_id: String,
    before: Vec<Player>,
    withdrawn: Vec<Player>,
}

impl PendingEdit {
    /// Counts the detached game again. Exact copies are put back when nothing
    /// touched these players during the edit, since subtracting and adding a
    /// float does not always return the same bits.
    ///
    /// Returns false when the deltas had to be added instead.
    fn reapply(&self, registry: &mut PlayerRegistry, game: &Game) -> LedgerResult<bool> {
        if registry.players_in(&game.results) == self.withdrawn {
            registry.restore(self.before.clone());
            Ok(true)
        } else {
            registry.apply_results(&game.results, Sign::Apply)?;
            Ok(false)
        }
    }
}

pub struct LedgerEngine {
    registry: PlayerRegistry,
    ledger: GameLedger,
    editing: Option<PendingEdit>,
    store: Box<dyn SnapshotStore>,
}

impl LedgerEngine {
    /// Builds the engine from whatever the store holds.
    pub fn open(store: Box<dyn SnapshotStore>) -> Self {
        let Snapshot { players, games } = store.load();
        let engine = Self {
            registry: PlayerRegistry::from_players(players),
            ledger: GameLedger::from_games(games),
            editing: None,
            store,
        };

        match engine.check() {
            Ok(report) if !report.is_consistent() => warn!(
                "Loaded statistics disagree with the game log ({} drifted, {} orphaned); run reconcile",
                report.drifted.len(),
                report.orphaned.len()
            ),
            Ok(_) => {}
            Err(e) => warn!("Could not verify loaded statistics: {}", e),
        }
        engine
    }

    pub fn add_player(&mut self, name: &str) -> LedgerResult<Player> {
        let player = self.registry.add_player(name)?;
        self.persist()?;
        Ok(player)
    }

    /// Records a finished game from the four seats in East, South, West, North order.
    pub fn record_game(&mut self, seats: [SeatEntry; 4]) -> LedgerResult<Game> {
        let seated = input::validate_selection(&seats)?;
        let raw = seats.each_ref().map(|s| s.final_score.as_deref());
        let table = input::parse_scores(seated, raw)?;

        let table = table.map(|(seat, name, score)| (seat, self.display_name(&name), score));
        let results = rank_results(table);
        self.registry.apply_results(&results, Sign::Apply)?;

        let id = domain::fresh_id(Utc::now(), |id| self.ledger.contains(id));
        let game = Game {
            id,
            date: Utc::now(),
            results,
        };
        info!("Recorded game {}: {}", game.id, summarize(&game));
        self.ledger.prepend(game.clone());

        self.persist()?;
        Ok(game)
    }

    /// Removes a game and withdraws its effect. There is no undo.
    pub fn delete_game(&mut self, game_id: &str) -> LedgerResult<()> {
        let game = self.find_game(game_id)?;

        if self.editing() == Some(game_id) {
            // already withdrawn by begin_edit
            self.editing = None;
        } else if let Err(e) = self.registry.apply_results(&game.results, Sign::Reverse) {
            return self.state_error(e);
        }

        self.ledger.remove(game_id);
        self.resum_points(&game.results);
        info!("Deleted game {}", game_id);
        self.persist()
    }

    /// Withdraws a game's effect so its scores can be re-entered.
    pub fn begin_edit(&mut self, game_id: &str) -> LedgerResult<EditSession> {
        self.ensure_idle()?;

        let game = self.find_game(game_id)?;
        let before = self.registry.players_in(&game.results);
        if let Err(e) = self.registry.apply_results(&game.results, Sign::Reverse) {
            return self.state_error(e);
        }
        self.editing = Some(PendingEdit {
            game_id: game_id.to_string(),
            before,
            withdrawn: self.registry.players_in(&game.results),
        });

        info!("Editing game {}", game_id);
        Ok(EditSession::from_game(&game))
    }

    /// Replaces the scores of the game being edited, given in seat order.
    ///
    /// On invalid input the original results are applied again and the
    /// error is returned, leaving the ledger as it was before the edit began.
    pub fn commit_edit<S: AsRef<str>>(&mut self, game_id: &str, scores: [S; 4]) -> LedgerResult<Game> {
        let game = self.find_game(game_id)?;
        let pending = self.take_edit(game_id)?;

        let by_seat = game.results_by_seat();
        let seated: [(Seat, String); 4] =
            std::array::from_fn(|i| (by_seat[i].position, by_seat[i].name.clone()));
        let raw = scores.each_ref().map(|s| Some(s.as_ref()));

        let table = match input::parse_scores(seated, raw) {
            Ok(table) => table,
            Err(e) => {
                self.reattach(&pending, &game)?;
                warn!("Edit of game {} rejected: {}", game_id, e);
                return Err(e);
            }
        };

        let results = rank_results(table);
        self.registry.apply_results(&results, Sign::Apply)?;
        self.ledger.replace_results(game_id, results.clone());
        self.resum_points(&results);

        let updated = Game { results, ..game };
        info!("Updated game {}: {}", updated.id, summarize(&updated));
        self.persist()?;
        Ok(updated)
    }

    /// Abandons an edit and applies the original results again.
    pub fn cancel_edit(&mut self, game_id: &str) -> LedgerResult<()> {
        if self.editing() != Some(game_id) {
            warn!("Ignoring cancel for game {}: it is not being edited", game_id);
            return Ok(());
        }

        let game = self.find_game(game_id)?;
        let pending = self.take_edit(game_id)?;
        self.reattach(&pending, &game)?;

        info!("Cancelled edit of game {}", game_id);
        Ok(())
    }

    /// Compares the stored aggregates with a replay of the ledger.
    pub fn check(&self) -> LedgerResult<ReconcileReport> {
        self.ensure_idle()?;
        let (_, report) = reconcile::replay(&self.registry, &self.ledger)?;
        Ok(report)
    }

    /// Rebuilds every player's aggregates from the ledger and saves them.
    pub fn reconcile(&mut self) -> LedgerResult<ReconcileReport> {
        self.ensure_idle()?;
        let (rebuilt, report) = reconcile::replay(&self.registry, &self.ledger)?;

        for drift in &report.drifted {
            info!(
                "Corrected {}: {:.1} -> {:.1} points, {} -> {} games",
                drift.stored.name,
                drift.stored.total_points,
                drift.expected.total_points,
                drift.stored.games_played,
                drift.expected.games_played
            );
        }
        self.registry = rebuilt;

        self.persist()?;
        Ok(report)
    }

    /// Players by total points, highest first.
    pub fn leaderboard(&self) -> Vec<Player> {
        self.registry.list_by_total_points_descending()
    }

    /// Games, most recent first.
    pub fn history(&self) -> &[Game] {
        self.ledger.games()
    }

    pub fn players(&self) -> &[Player] {
        self.registry.players()
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.registry.find(name)
    }

    pub fn game(&self, game_id: &str) -> Option<&Game> {
        self.ledger.get(game_id)
    }

    /// 1-based position of a game in the history.
    pub fn game_number(&self, game_id: &str) -> Option<usize> {
        self.ledger.number_of(game_id)
    }

    /// Id of the game currently detached for editing.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_ref().map(|pending| pending.game_id.as_str())
    }

    pub fn ready_for_game(&self) -> bool {
        self.registry.ready_for_game()
    }

    /// Both collections as they should be persisted. A detached game is
    /// counted again so the saved aggregates always match the saved games.
    pub fn snapshot(&self) -> Snapshot {
        let mut registry = self.registry.clone();
        if let Some(pending) = &self.editing {
            if let Some(game) = self.ledger.get(&pending.game_id) {
                match pending.reapply(&mut registry, game) {
                    Ok(true) => {}
                    Ok(false) => registry.resum_points(&game.results, self.ledger.oldest_first()),
                    Err(e) => warn!("Saving without the game under edit: {}", e),
                }
            }
        }

        Snapshot {
            players: registry.into_players(),
            games: self.ledger.games().to_vec(),
        }
    }

    fn persist(&self) -> LedgerResult<()> {
        self.store.save(&self.snapshot()).map_err(|e| {
            warn!("Changes kept in memory only ({}): {:#}", self.store.location(), e);
            LedgerError::Storage(e)
        })
    }

    /// Applies a detached game again after its edit was cleared.
    fn reattach(&mut self, pending: &PendingEdit, game: &Game) -> LedgerResult<()> {
        if !pending.reapply(&mut self.registry, game)? {
            self.resum_points(&game.results);
        }
        Ok(())
    }

    /// Totals of the players behind `results`, summed again over the applied
    /// games in recording order.
    fn resum_points(&mut self, results: &[SeatResult]) {
        let detached = self.editing.as_ref().map(|pending| pending.game_id.as_str());
        let applied = self
            .ledger
            .oldest_first()
            .filter(|game| Some(game.id.as_str()) != detached);
        self.registry.resum_points(results, applied);
    }

    fn display_name(&self, name: &str) -> String {
        self.registry
            .find(name)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| name.to_string())
    }

    fn find_game(&self, game_id: &str) -> LedgerResult<Game> {
        match self.ledger.get(game_id) {
            Some(game) => Ok(game.clone()),
            None => self.state_error(LedgerError::NotFound {
                game_id: game_id.to_string(),
            }),
        }
    }

    /// Clears the edit marker if it belongs to `game_id`.
    fn take_edit(&mut self, game_id: &str) -> LedgerResult<PendingEdit> {
        if self.editing() != Some(game_id) {
            return self.state_error(LedgerError::NotEditing {
                game_id: game_id.to_string(),
            });
        }
        match self.editing.take() {
            Some(pending) => Ok(pending),
            None => self.state_error(LedgerError::NotEditing {
                game_id: game_id.to_string(),
            }),
        }
    }

    fn ensure_idle(&self) -> LedgerResult<()> {
        match self.editing() {
            Some(current) => self.state_error(LedgerError::AlreadyEditing {
                game_id: current.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn state_error<T>(&self, error: LedgerError) -> LedgerResult<T> {
        warn!("{}", error);
        Err(error)
    }
}

fn rank_results(table: [(Seat, String, f64); 4]) -> [SeatResult; 4] {
    let entries = table.map(|(seat, name, score)| ((seat, name), score));
    scoring::assign_ranks(entries).map(|ranked| {
        let (position, name) = ranked.entry;
        SeatResult {
            name,
            position,
            final_score: ranked.final_score,
            rank: ranked.rank,
            leaderboard_score: ranked.leaderboard_score,
        }
    })
}

fn summarize(game: &Game) -> String {
    game.results
        .iter()
        .map(|r| format!("{}. {} {:+.1}", r.rank, r.name, r.leaderboard_score))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests;
