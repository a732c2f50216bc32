pub mod rank;

pub use rank::{InvalidRank, Rank};

/// Suggested starting table score. Only used for input hints.
pub const STARTING_POINTS: f64 = 25000.0;

/// Table score that converts to zero leaderboard points.
pub const REFERENCE_POINTS: f64 = 30000.0;

/// Table points per leaderboard point.
pub const POINTS_TO_LEADERBOARD: f64 = 1000.0;

/// Leaderboard delta for a single seat.
///
/// `(final_score - 30000) / 1000 + bonus(rank)`, never rounded.
pub fn score(final_score: f64, rank: Rank) -> f64 {
    let score_component = (final_score - REFERENCE_POINTS) / POINTS_TO_LEADERBOARD;
    score_component + rank.bonus()
}

/// A seat's final score after ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub entry: T,
    pub final_score: f64,
    pub rank: Rank,
    pub leaderboard_score: f64,
}

/// Orders a table's four entries by final score, highest first, and attaches
/// rank and delta.
///
/// The sort is stable, so equal scores keep their input (seat) order.
pub fn assign_ranks<T>(entries: [(T, f64); 4]) -> [Ranked<T>; 4] {
    let mut entries = entries;
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));

    let [first, second, third, fourth] = entries;
    [
        (first, Rank::First),
        (second, Rank::Second),
        (third, Rank::Third),
        (fourth, Rank::Fourth),
    ]
    .map(|((entry, final_score), rank)| Ranked {
        entry,
        final_score,
        rank,
        leaderboard_score: score(final_score, rank),
    })
}
