use chrono::Utc;
use log::{debug, info};
use std::collections::HashMap;

use crate::domain::{self, Game, Player, SeatResult, normalize_name};
use crate::errors::{LedgerError, LedgerResult};

/// Direction of a stat adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Apply,
    Reverse,
}

impl Sign {
    fn factor(self) -> f64 {
        match self {
            Sign::Apply => 1.0,
            Sign::Reverse => -1.0,
        }
    }
}

/// Players and their running aggregates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn add_player(&mut self, name: &str) -> LedgerResult<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }

        if self.find(name).is_some() {
            return Err(LedgerError::DuplicatePlayer {
                name: name.to_string(),
            });
        }

        let id = domain::fresh_id(Utc::now(), |id| self.players.iter().any(|p| p.id == id));
        let player = Player::new(id, name.to_string());
        info!("Registered player {} ({})", player.name, player.id);

        self.players.push(player.clone());
        Ok(player)
    }

    pub fn find(&self, name: &str) -> Option<&Player> {
        self.position_of(name).map(|idx| &self.players[idx])
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// A game needs four distinct registered players.
    pub fn ready_for_game(&self) -> bool {
        self.players.len() >= 4
    }

    /// Applies or reverses one seat result.
    pub fn apply_result(&mut self, result: &SeatResult, sign: Sign) -> LedgerResult<()> {
        self.apply_results(std::slice::from_ref(result), sign)
    }

    /// Applies or reverses a batch of seat results, all or nothing.
    ///
    /// Names that resolve to no player are skipped. If any counter would drop
    /// below zero the registry is left untouched.
    pub fn apply_results(&mut self, results: &[SeatResult], sign: Sign) -> LedgerResult<()> {
        let mut staged: HashMap<usize, Player> = HashMap::new();

        for result in results {
            let Some(idx) = self.position_of(&result.name) else {
                debug!("Skipping result for unknown player {}", result.name);
                continue;
            };

            let player = staged
                .entry(idx)
                .or_insert_with(|| self.players[idx].clone());
            adjust(player, result, sign)?;
        }

        for (idx, player) in staged {
            self.players[idx] = player;
        }
        Ok(())
    }

    /// Recomputes the total points of the players behind `results` by adding
    /// their deltas from `games` in iteration order, starting from zero.
    ///
    /// Fed oldest game first this gives back the exact sum that recording
    /// those games produced, which subtracting a float delta does not.
    pub fn resum_points<'a>(&mut self, results: &[SeatResult], games: impl IntoIterator<Item = &'a Game>) {
        let mut totals: Vec<(usize, f64)> = results
            .iter()
            .filter_map(|r| self.position_of(&r.name))
            .map(|idx| (idx, 0.0))
            .collect();

        for game in games {
            for (idx, total) in &mut totals {
                if let Some(result) = game.result_for(&self.players[*idx].name) {
                    *total += result.leaderboard_score;
                }
            }
        }

        for (idx, total) in totals {
            self.players[idx].total_points = total;
        }
    }

    /// Players ordered by total points, highest first. Ties keep registration order.
    pub fn list_by_total_points_descending(&self) -> Vec<Player> {
        let mut sorted = self.players.clone();
        sorted.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
        sorted
    }

    /// Copies of the players behind the given result names, in registry order.
    pub fn players_in(&self, results: &[SeatResult]) -> Vec<Player> {
        self.players
            .iter()
            .filter(|p| results.iter().any(|r| normalize_name(&r.name) == p.key()))
            .cloned()
            .collect()
    }

    /// Puts back previously copied players, matched by id.
    pub fn restore(&mut self, players: Vec<Player>) {
        for player in players {
            if let Some(slot) = self.players.iter_mut().find(|p| p.id == player.id) {
                *slot = player;
            }
        }
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    pub(crate) fn reset_stats(&mut self) {
        for player in &mut self.players {
            player.reset_stats();
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let key = normalize_name(name);
        self.players.iter().position(|p| p.key() == key)
    }
}

fn adjust(player: &mut Player, result: &SeatResult, sign: Sign) -> LedgerResult<()> {
    let corrupt = || LedgerError::CorruptStats {
        player: player.name.clone(),
    };

    let slot = player.rank_counts.slot_mut(result.rank);
    match sign {
        Sign::Apply => {
            *slot += 1;
            player.games_played += 1;
        }
        Sign::Reverse => {
            *slot = slot.checked_sub(1).ok_or_else(corrupt)?;
            player.games_played = player.games_played.checked_sub(1).ok_or_else(corrupt)?;
        }
    }

    player.total_points += sign.factor() * result.leaderboard_score;
    player.recompute_average_rank();
    Ok(())
}
