use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placement within a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rank {
    First,
    Second,
    Third,
    Fourth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rank must be between 1 and 4, got {0}")]
pub struct InvalidRank(pub u8);

impl Rank {
    pub const ALL: [Rank; 4] = [Rank::First, Rank::Second, Rank::Third, Rank::Fourth];

    /// Leaderboard points awarded for the placement alone.
    pub fn bonus(self) -> f64 {
        match self {
            Rank::First => 50.0,
            Rank::Second => 10.0,
            Rank::Third => -10.0,
            Rank::Fourth => -30.0,
        }
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Rank {
    type Error = InvalidRank;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rank::First),
            2 => Ok(Rank::Second),
            3 => Ok(Rank::Third),
            4 => Ok(Rank::Fourth),
            other => Err(InvalidRank(other)),
        }
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.number()
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}
