use std::collections::BTreeSet;

use crate::domain::Player;
use crate::errors::LedgerResult;
use crate::ledger::GameLedger;
use crate::registry::{PlayerRegistry, Sign};

// Replayed float sums may differ from incremental ones in the last bits.
const POINTS_TOLERANCE: f64 = 1e-9;

/// A player whose stored aggregates differ from a replay of the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsDrift {
    pub stored: Player,
    pub expected: Player,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub games_replayed: usize,
    pub drifted: Vec<StatsDrift>,
    /// Result names that match no registered player; their points count nowhere.
    pub orphaned: Vec<String>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.drifted.is_empty() && self.orphaned.is_empty()
    }
}

/// Rebuilds every aggregate from zero by replaying the ledger, oldest game first.
pub(crate) fn replay(
    registry: &PlayerRegistry,
    ledger: &GameLedger,
) -> LedgerResult<(PlayerRegistry, ReconcileReport)> {
    let mut rebuilt = registry.clone();
    rebuilt.reset_stats();

    let mut orphaned = BTreeSet::new();
    for game in ledger.oldest_first() {
        for result in &game.results {
            if rebuilt.find(&result.name).is_none() {
                orphaned.insert(result.name.clone());
            }
        }
        rebuilt.apply_results(&game.results, Sign::Apply)?;
    }

    let drifted = registry
        .players()
        .iter()
        .zip(rebuilt.players())
        .filter(|(stored, expected)| has_drifted(stored, expected))
        .map(|(stored, expected)| StatsDrift {
            stored: stored.clone(),
            expected: expected.clone(),
        })
        .collect();

    let report = ReconcileReport {
        games_replayed: ledger.len(),
        drifted,
        orphaned: orphaned.into_iter().collect(),
    };
    Ok((rebuilt, report))
}

fn has_drifted(stored: &Player, expected: &Player) -> bool {
    stored.games_played != expected.games_played
        || stored.rank_counts != expected.rank_counts
        || (stored.total_points - expected.total_points).abs() > POINTS_TOLERANCE
        || (stored.average_rank - expected.average_rank).abs() > POINTS_TOLERANCE
}
