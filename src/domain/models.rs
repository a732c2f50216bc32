use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring::{InvalidRank, Rank};

/// Table position, stored with the glyphs used at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Seat {
    #[serde(rename = "东", alias = "East", alias = "east")]
    East,
    #[serde(rename = "南", alias = "South", alias = "south")]
    South,
    #[serde(rename = "西", alias = "West", alias = "west")]
    West,
    #[serde(rename = "北", alias = "North", alias = "north")]
    North,
}

impl Seat {
    pub const ALL: [Seat; 4] = [Seat::East, Seat::South, Seat::West, Seat::North];

    pub fn glyph(self) -> &'static str {
        match self {
            Seat::East => "东",
            Seat::South => "南",
            Seat::West => "西",
            Seat::North => "北",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::str::FromStr for Seat {
    type Err = String;

    /// Accepts the glyph, the English name or its initial.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "东" | "east" | "e" => Ok(Seat::East),
            "南" | "south" | "s" => Ok(Seat::South),
            "西" | "west" | "w" => Ok(Seat::West),
            "北" | "north" | "n" => Ok(Seat::North),
            other => Err(format!("unknown seat: {}", other)),
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Seat::East => "East",
            Seat::South => "South",
            Seat::West => "West",
            Seat::North => "North",
        };
        write!(f, "{} ({})", self.glyph(), name)
    }
}

/// Occurrences of each placement, indexed by rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, u32>", into = "BTreeMap<u8, u32>")]
pub struct RankCounts([u32; 4]);

impl RankCounts {
    pub fn new(counts: [u32; 4]) -> Self {
        Self(counts)
    }

    pub fn as_array(&self) -> [u32; 4] {
        self.0
    }

    pub fn get(&self, rank: Rank) -> u32 {
        self.0[rank.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Weighted sum of placements, `Σ rank * count`.
    pub fn rank_sum(&self) -> u32 {
        Rank::ALL
            .iter()
            .map(|&rank| u32::from(rank.number()) * self.get(rank))
            .sum()
    }

    pub(crate) fn slot_mut(&mut self, rank: Rank) -> &mut u32 {
        &mut self.0[rank.index()]
    }
}

impl TryFrom<BTreeMap<u8, u32>> for RankCounts {
    type Error = InvalidRank;

    fn try_from(map: BTreeMap<u8, u32>) -> Result<Self, Self::Error> {
        let mut counts = RankCounts::default();
        for (number, count) in map {
            let rank = Rank::try_from(number)?;
            *counts.slot_mut(rank) = count;
        }
        Ok(counts)
    }
}

impl From<RankCounts> for BTreeMap<u8, u32> {
    fn from(counts: RankCounts) -> Self {
        Rank::ALL
            .iter()
            .map(|&rank| (rank.number(), counts.get(rank)))
            .collect()
    }
}

/// Registered player with running aggregates over the current ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub total_points: f64,
    pub games_played: u32,
    pub average_rank: f64,
    pub rank_counts: RankCounts,
}

impl Player {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            total_points: 0.0,
            games_played: 0,
            average_rank: 0.0,
            rank_counts: RankCounts::default(),
        }
    }

    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn recompute_average_rank(&mut self) {
        self.average_rank = if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.rank_counts.rank_sum()) / f64::from(self.games_played)
        };
    }

    pub(crate) fn reset_stats(&mut self) {
        self.total_points = 0.0;
        self.games_played = 0;
        self.average_rank = 0.0;
        self.rank_counts = RankCounts::default();
    }
}

/// One seat's outcome inside a recorded game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatResult {
    pub name: String,
    pub position: Seat,
    pub final_score: f64,
    pub rank: Rank,
    pub leaderboard_score: f64,
}

/// A completed game. Results are kept in rank order, first place first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub date: DateTime<Utc>,
    pub results: [SeatResult; 4],
}

impl Game {
    pub fn result_for(&self, name: &str) -> Option<&SeatResult> {
        let key = normalize_name(name);
        self.results.iter().find(|r| normalize_name(&r.name) == key)
    }

    /// Results reordered East, South, West, North.
    pub fn results_by_seat(&self) -> Vec<&SeatResult> {
        let mut by_seat: Vec<&SeatResult> = self.results.iter().collect();
        by_seat.sort_by_key(|r| r.position);
        by_seat
    }

    pub fn total_delta(&self) -> f64 {
        self.results.iter().map(|r| r.leaderboard_score).sum()
    }

    pub fn total_final_score(&self) -> f64 {
        self.results.iter().map(|r| r.final_score).sum()
    }
}

/// Identity key for player names: trimmed and case-folded.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
