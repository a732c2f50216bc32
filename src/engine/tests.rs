use anyhow::Result;

use super::*;
use crate::errors::ErrorKind;
use crate::scoring::Rank;
use crate::storage::MemoryStore;

struct FailingStore;

impl SnapshotStore for FailingStore {
    fn load(&self) -> Snapshot {
        Snapshot::default()
    }

    fn save(&self, _snapshot: &Snapshot) -> Result<()> {
        anyhow::bail!("read-only file system")
    }

    fn location(&self) -> String {
        "nowhere".to_string()
    }
}

fn engine_with_players(names: &[&str]) -> (LedgerEngine, MemoryStore) {
    let store = MemoryStore::new();
    let mut engine = LedgerEngine::open(Box::new(store.clone()));
    for name in names {
        engine.add_player(name).unwrap();
    }
    (engine, store)
}

fn seats(entries: [(&str, &str); 4]) -> [SeatEntry; 4] {
    entries.map(|(name, score)| SeatEntry::new(name, score))
}

fn standard_table() -> [SeatEntry; 4] {
    seats([
        ("Alice", "25000"),
        ("Bob", "30000"),
        ("Carol", "20000"),
        ("Dan", "25000"),
    ])
}

fn points(engine: &LedgerEngine, name: &str) -> f64 {
    engine.player(name).unwrap().total_points
}

/// Every player's aggregates must equal the sum over the games in the ledger.
fn assert_consistent(engine: &LedgerEngine) {
    for player in engine.players() {
        let results: Vec<_> = engine
            .history()
            .iter()
            .filter_map(|g| g.result_for(&player.name))
            .collect();
        let expected: f64 = results.iter().map(|r| r.leaderboard_score).sum();

        assert!(
            (player.total_points - expected).abs() < 1e-9,
            "{}: {} != {}",
            player.name,
            player.total_points,
            expected
        );
        assert_eq!(player.games_played as usize, results.len());
        assert_eq!(player.rank_counts.total(), player.games_played);
        for rank in Rank::ALL {
            let count = results.iter().filter(|r| r.rank == rank).count();
            assert_eq!(player.rank_counts.get(rank) as usize, count);
        }
    }
}

#[test]
fn test_record_assigns_ranks_with_seat_tie_break() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);

    let game = engine.record_game(standard_table()).unwrap();

    let ranked: Vec<_> = game
        .results
        .iter()
        .map(|r| (r.name.as_str(), r.position, r.rank, r.leaderboard_score))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Bob", Seat::South, Rank::First, 50.0),
            ("Alice", Seat::East, Rank::Second, 5.0),
            ("Dan", Seat::North, Rank::Third, -15.0),
            ("Carol", Seat::West, Rank::Fourth, -40.0),
        ]
    );
    assert_eq!(points(&engine, "Bob"), 50.0);
    assert_eq!(engine.player("Alice").unwrap().average_rank, 2.0);
    assert_consistent(&engine);
}

#[test]
fn test_balanced_table_adds_twenty_points() {
    let (mut engine, _) = engine_with_players(&["A", "B", "C", "D"]);

    let game = engine
        .record_game(seats([("A", "41000"), ("B", "33000"), ("C", "27000"), ("D", "19000")]))
        .unwrap();

    assert_eq!(game.total_final_score(), 120000.0);
    assert_eq!(game.total_delta(), 20.0);
    let total: f64 = engine.players().iter().map(|p| p.total_points).sum();
    assert_eq!(total, 20.0);
}

#[test]
fn test_history_is_most_recent_first() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);

    let first = engine.record_game(standard_table()).unwrap();
    let second = engine.record_game(standard_table()).unwrap();

    let ids: Vec<_> = engine.history().iter().map(|g| g.id.clone()).collect();
    assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);
    assert_ne!(first.id, second.id);
    assert_eq!(engine.game_number(&first.id), Some(2));
    assert_eq!(store.saved().unwrap().games.len(), 2);
    assert_consistent(&engine);
}

#[test]
fn test_names_use_registered_spelling() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);

    let game = engine
        .record_game(seats([("alice", "25000"), ("BOB", "25000"), ("Carol", "25000"), (" dan ", "25000")]))
        .unwrap();

    let names: Vec<_> = game.results_by_seat().iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol", "Dan"]);
    assert_consistent(&engine);
}

#[test]
fn test_incomplete_selection_mutates_nothing() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let before = engine.snapshot();

    let mut table = standard_table();
    table[3] = SeatEntry::empty();
    let err = engine.record_game(table).unwrap_err();

    assert!(matches!(err, LedgerError::IncompleteSelection { filled: 3 }));
    assert_eq!(err.kind(), ErrorKind::UserInput);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_duplicate_and_invalid_input_mutate_nothing() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let before = engine.snapshot();

    let err = engine
        .record_game(seats([("Alice", "1"), ("Bob", "1"), ("alice", "1"), ("Dan", "1")]))
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicatePlayer { .. }));

    let err = engine
        .record_game(seats([("Alice", "1"), ("Bob", "1"), ("Carol", "-1"), ("Dan", "1")]))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidScore { seat: Seat::West, .. }));

    let mut table = standard_table();
    table[1].final_score = None;
    let err = engine.record_game(table).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidScore { seat: Seat::South, .. }));

    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_record_then_delete_restores_registry() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    engine.record_game(standard_table()).unwrap();
    let before = engine.snapshot();

    let game = engine
        .record_game(seats([("Dan", "52000"), ("Carol", "31000"), ("Bob", "22000"), ("Alice", "15000")]))
        .unwrap();
    engine.delete_game(&game.id).unwrap();

    assert_eq!(engine.snapshot(), before);
    assert_eq!(store.saved().unwrap(), before);
}

#[test]
fn test_delete_unknown_game_is_not_found() {
    let (mut engine, _) = engine_with_players(&[]);

    let err = engine.delete_game("404").unwrap_err();

    assert!(matches!(err, LedgerError::NotFound { ref game_id } if game_id == "404"));
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn test_edit_replaces_results_in_place() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let original = engine.record_game(standard_table()).unwrap();

    let session = engine.begin_edit(&original.id).unwrap();
    assert_eq!(engine.editing(), Some(original.id.as_str()));
    let prefill: Vec<_> = session.seats.iter().map(|s| (s.player.as_str(), s.final_score)).collect();
    assert_eq!(
        prefill,
        vec![("Alice", 25000.0), ("Bob", 30000.0), ("Carol", 20000.0), ("Dan", 25000.0)]
    );
    assert_eq!(engine.player("Bob").unwrap().games_played, 0);

    let updated = engine
        .commit_edit(&original.id, ["45000", "25000", "25000", "25000"])
        .unwrap();

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.date, original.date);
    assert_eq!(updated.results[0].name, "Alice");
    assert_eq!(updated.results[1].name, "Bob");
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.game(&original.id), Some(&updated));
    assert_eq!(engine.editing(), None);
    assert_eq!(points(&engine, "Alice"), 65.0);
    assert_consistent(&engine);
}

#[test]
fn test_invalid_commit_restores_pre_edit_state() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    engine
        .record_game(seats([("Alice", "30100"), ("Bob", "29900"), ("Carol", "33300"), ("Dan", "26700")]))
        .unwrap();
    let game = engine
        .record_game(seats([("Alice", "12300"), ("Bob", "45600"), ("Carol", "28800"), ("Dan", "33300")]))
        .unwrap();
    let before = engine.snapshot();
    let saved_before = store.saved();

    engine.begin_edit(&game.id).unwrap();
    let err = engine
        .commit_edit(&game.id, ["25000", "abc", "25000", "25000"])
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidScore { seat: Seat::South, ref player, .. } if player == "Bob"));
    assert_eq!(engine.editing(), None);
    assert_eq!(engine.snapshot(), before);
    assert_eq!(store.saved(), saved_before);
}

#[test]
fn test_cancel_edit_restores_state() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let game = engine
        .record_game(seats([("Alice", "30100"), ("Bob", "29900"), ("Carol", "33300"), ("Dan", "26700")]))
        .unwrap();
    let before = engine.snapshot();

    engine.begin_edit(&game.id).unwrap();
    engine.cancel_edit(&game.id).unwrap();

    assert_eq!(engine.editing(), None);
    assert_eq!(engine.snapshot(), before);

    // a second cancel must not count the game twice
    engine.cancel_edit(&game.id).unwrap();
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_only_one_edit_at_a_time() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let first = engine.record_game(standard_table()).unwrap();
    let second = engine.record_game(standard_table()).unwrap();

    engine.begin_edit(&first.id).unwrap();
    let err = engine.begin_edit(&second.id).unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyEditing { ref game_id } if *game_id == first.id));

    let err = engine.commit_edit(&second.id, ["1", "1", "1", "1"]).unwrap_err();
    assert!(matches!(err, LedgerError::NotEditing { .. }));

    assert!(matches!(engine.check(), Err(LedgerError::AlreadyEditing { .. })));

    engine.cancel_edit(&first.id).unwrap();
    assert!(engine.begin_edit("missing").is_err());
    assert_eq!(engine.editing(), None);
    assert_consistent(&engine);
}

#[test]
fn test_delete_game_under_edit() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let game = engine.record_game(standard_table()).unwrap();

    engine.begin_edit(&game.id).unwrap();
    engine.delete_game(&game.id).unwrap();

    assert_eq!(engine.editing(), None);
    assert!(engine.history().is_empty());
    for player in engine.players() {
        assert_eq!(player.games_played, 0);
        assert_eq!(player.total_points, 0.0);
    }
}

#[test]
fn test_saves_during_edit_count_the_detached_game() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan", "Eve"]);
    let game = engine.record_game(standard_table()).unwrap();

    engine.begin_edit(&game.id).unwrap();
    engine
        .record_game(seats([("Eve", "40000"), ("Bob", "30000"), ("Carol", "30000"), ("Dan", "20000")]))
        .unwrap();

    let saved = store.saved().unwrap();
    let reopened = LedgerEngine::open(Box::new(MemoryStore::with_snapshot(saved)));
    assert!(reopened.check().unwrap().is_consistent());
    assert_eq!(reopened.player("Bob").unwrap().games_played, 2);

    engine.cancel_edit(&game.id).unwrap();
    assert_consistent(&engine);
}

#[test]
fn test_storage_failure_keeps_the_change() {
    let mut engine = LedgerEngine::open(Box::new(FailingStore));

    let err = engine.add_player("Alice").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(err.to_string().contains("read-only file system"));
    assert!(engine.player("Alice").is_some());
}

#[test]
fn test_duplicate_player_is_case_insensitive() {
    let (mut engine, _) = engine_with_players(&["Alice"]);

    let err = engine.add_player(" alice ").unwrap_err();

    assert!(matches!(err, LedgerError::DuplicatePlayer { .. }));
    assert_eq!(engine.players().len(), 1);
    assert!(matches!(engine.add_player(""), Err(LedgerError::EmptyName)));
}

#[test]
fn test_leaderboard_orders_by_points() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    engine.record_game(standard_table()).unwrap();

    let names: Vec<_> = engine.leaderboard().into_iter().map(|p| p.name).collect();

    assert_eq!(names, vec!["Bob", "Alice", "Dan", "Carol"]);
    assert!(engine.ready_for_game());
}

#[test]
fn test_reopen_restores_state() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    engine.record_game(standard_table()).unwrap();

    let reopened = LedgerEngine::open(Box::new(store.clone()));

    assert_eq!(reopened.snapshot(), engine.snapshot());
}

#[test]
fn test_reconcile_repairs_drift_and_reports_orphans() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    engine.record_game(standard_table()).unwrap();

    let mut damaged = store.saved().unwrap();
    damaged.players[0].total_points = 999.0;
    damaged.games[0].results[3].name = "Zed".to_string();
    let mut engine = LedgerEngine::open(Box::new(MemoryStore::with_snapshot(damaged)));

    let report = engine.check().unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.orphaned, vec!["Zed".to_string()]);

    let report = engine.reconcile().unwrap();
    assert_eq!(report.games_replayed, 1);
    let drifted: Vec<_> = report.drifted.iter().map(|d| d.stored.name.as_str()).collect();
    assert_eq!(drifted, vec!["Alice", "Carol"]);
    assert_eq!(points(&engine, "Alice"), 5.0);
    assert_eq!(engine.player("Carol").unwrap().games_played, 0);
    assert_consistent(&engine);
}

#[test]
fn test_delete_with_fractional_deltas_restores_exact_totals() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    engine
        .record_game(seats([("Alice", "30100"), ("Bob", "29900"), ("Carol", "33300"), ("Dan", "26700")]))
        .unwrap();
    let before = engine.snapshot();

    let game = engine
        .record_game(seats([("Alice", "30200"), ("Bob", "29800"), ("Carol", "33400"), ("Dan", "26600")]))
        .unwrap();
    engine.delete_game(&game.id).unwrap();

    for (now, then) in engine.players().iter().zip(&before.players) {
        assert_eq!(now.total_points.to_bits(), then.total_points.to_bits(), "{}", now.name);
    }
    assert_eq!(engine.snapshot(), before);
    assert_eq!(store.saved().unwrap(), before);
}

#[test]
fn test_delete_older_game_keeps_recording_order_sum() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let older = engine
        .record_game(seats([("Alice", "30100"), ("Bob", "29900"), ("Carol", "33300"), ("Dan", "26700")]))
        .unwrap();
    let newer = engine
        .record_game(seats([("Alice", "30200"), ("Bob", "29800"), ("Carol", "33400"), ("Dan", "26600")]))
        .unwrap();

    engine.delete_game(&older.id).unwrap();

    for result in &newer.results {
        let total = engine.player(&result.name).unwrap().total_points;
        assert_eq!(total.to_bits(), (0.0 + result.leaderboard_score).to_bits());
    }
}

#[test]
fn test_commit_edit_totals_match_recording_order_sum() {
    let (mut engine, _) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let first = engine
        .record_game(seats([("Alice", "30100"), ("Bob", "29900"), ("Carol", "33300"), ("Dan", "26700")]))
        .unwrap();
    engine
        .record_game(seats([("Alice", "31700"), ("Bob", "28300"), ("Carol", "24900"), ("Dan", "35100")]))
        .unwrap();

    engine.begin_edit(&first.id).unwrap();
    engine
        .commit_edit(&first.id, ["30300", "29700", "33100", "26900"])
        .unwrap();

    for player in engine.players() {
        let mut expected = 0.0;
        for game in engine.history().iter().rev() {
            if let Some(result) = game.result_for(&player.name) {
                expected += result.leaderboard_score;
            }
        }
        assert_eq!(player.total_points.to_bits(), expected.to_bits(), "{}", player.name);
    }
}

#[test]
fn test_reversal_below_zero_is_a_state_error() {
    let (mut engine, store) = engine_with_players(&["Alice", "Bob", "Carol", "Dan"]);
    let game = engine.record_game(standard_table()).unwrap();

    let mut damaged = store.saved().unwrap();
    damaged.players[1].games_played = 0;
    let mut engine = LedgerEngine::open(Box::new(MemoryStore::with_snapshot(damaged)));
    let before = engine.snapshot();

    let err = engine.delete_game(&game.id).unwrap_err();
    assert!(matches!(err, LedgerError::CorruptStats { ref player } if player == "Bob"));
    assert_eq!(err.kind(), ErrorKind::State);

    let err = engine.begin_edit(&game.id).unwrap_err();
    assert!(matches!(err, LedgerError::CorruptStats { .. }));
    assert_eq!(engine.editing(), None);
    assert_eq!(engine.snapshot(), before);
}
