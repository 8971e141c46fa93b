//! Integration tests for the results merge: validation, additivity, name matching.

use chrono::{TimeZone, Utc};
use poker_leaderboard::store::ScanPage;
use poker_leaderboard::{
    merge_results_at, Leaderboard, LeaderboardError, MemoryStore, Player, PlayerStore,
    PlayerUpdate, StoreError, SubmittedRow,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a `FailingStore` misbehaves on its chosen write.
#[derive(Clone, Copy)]
enum Failure {
    Error,
    Panic,
}

/// Memory store whose `n`th write (1-based) fails; every other write goes through.
struct FailingStore {
    inner: MemoryStore,
    fail_on: usize,
    failure: Failure,
    writes: AtomicUsize,
}

impl FailingStore {
    fn new(fail_on: usize, failure: Failure) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on,
            failure,
            writes: AtomicUsize::new(0),
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if n != self.fail_on {
            return Ok(());
        }
        match self.failure {
            Failure::Error => Err(StoreError::Io(std::io::Error::other(
                "disk /var/lib/secret-volume unreachable",
            ))),
            Failure::Panic => panic!("store crashed mid-write"),
        }
    }
}

impl PlayerStore for FailingStore {
    fn scan_page(&self, start_after: Option<&str>) -> Result<ScanPage, StoreError> {
        self.inner.scan_page(start_after)
    }

    fn put(&self, player: &Player) -> Result<(), StoreError> {
        self.check()?;
        self.inner.put(player)
    }

    fn update(&self, id: &str, update: &PlayerUpdate) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update(id, update)
    }
}

fn row(place: &str, name: &str, points: i64) -> SubmittedRow {
    SubmittedRow::new(place, name, Decimal::from(points))
}

fn players(store: &MemoryStore) -> Vec<Player> {
    let mut players = store.load_players().unwrap();
    players.sort_by(|a, b| a.name.cmp(&b.name));
    players
}

fn find<'a>(players: &'a [Player], name: &str) -> &'a Player {
    players.iter().find(|p| p.name == name).unwrap()
}

#[test]
fn creates_new_players() {
    let store = MemoryStore::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 21, 30, 15).unwrap();
    let summary = merge_results_at(
        &store,
        &[row("1st", "Bob", 10), row("2nd", "Carol", 8)],
        now,
    )
    .unwrap();
    assert_eq!(summary.processed, 2);

    let players = players(&store);
    assert_eq!(players.len(), 2);
    let bob = find(&players, "Bob");
    assert_eq!(bob.points, Decimal::from(10));
    assert_eq!(bob.results, "1st");
    assert_eq!(bob.updated, "2026-03-01T21:30:15Z");
    assert!(!bob.id.is_empty());
    let carol = find(&players, "Carol");
    assert_eq!(carol.points, Decimal::from(8));
    assert_eq!(carol.results, "2nd");
    assert_ne!(bob.id, carol.id);
}

#[test]
fn existing_player_accumulates_points_and_results() {
    let store = MemoryStore::new();
    merge_results_at(&store, &[row("1st", "Alice", 10)], Utc::now()).unwrap();
    let id = players(&store)[0].id.clone();

    merge_results_at(&store, &[row("3rd", "Alice", 5)], Utc::now()).unwrap();

    let players = players(&store);
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].id, id);
    assert_eq!(players[0].points, Decimal::from(15));
    assert_eq!(players[0].results, "1st,3rd");
}

#[test]
fn name_matching_ignores_case() {
    let store = MemoryStore::new();
    merge_results_at(&store, &[row("1st", "Alice", 10)], Utc::now()).unwrap();
    merge_results_at(&store, &[row("2nd", "ALICE", 4)], Utc::now()).unwrap();
    merge_results_at(&store, &[row("Bubble", "  alice ", 1)], Utc::now()).unwrap();

    let players = players(&store);
    assert_eq!(players.len(), 1);
    // The stored display name is the one first seen.
    assert_eq!(players[0].name, "Alice");
    assert_eq!(players[0].points, Decimal::from(15));
    assert_eq!(players[0].results, "1st,2nd,Bubble");
}

#[test]
fn no_place_leaves_results_unchanged() {
    let store = MemoryStore::new();
    merge_results_at(&store, &[row("1st", "Dan", 10)], Utc::now()).unwrap();
    merge_results_at(&store, &[row("None", "Dan", 2)], Utc::now()).unwrap();
    merge_results_at(&store, &[row("None", "Erin", 3)], Utc::now()).unwrap();

    let players = players(&store);
    let dan = find(&players, "Dan");
    assert_eq!(dan.points, Decimal::from(12));
    assert_eq!(dan.results, "1st");
    let erin = find(&players, "Erin");
    assert_eq!(erin.points, Decimal::from(3));
    assert_eq!(erin.results, "");
}

#[test]
fn fractional_stored_points_add_exactly() {
    let store = MemoryStore::with_rows(
        vec![serde_json::json!({"id": "p1", "name": "Faye", "points": "10.10", "results": " 2nd "})
            .as_object()
            .cloned()
            .unwrap()],
        10,
    );
    merge_results_at(&store, &[row("1st", "faye", 5)], Utc::now()).unwrap();

    let players = players(&store);
    assert_eq!(players[0].id, "p1");
    assert_eq!(players[0].points, Decimal::new(1510, 2));
    assert_eq!(players[0].results, "2nd,1st");
}

#[test]
fn zero_points_rejects_whole_batch() {
    let store = MemoryStore::new();
    let err = merge_results_at(
        &store,
        &[row("1st", "Bob", 10), row("2nd", "Carol", 0)],
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, LeaderboardError::InvalidPoints));
    assert!(err.is_validation());
    assert!(store.load_players().unwrap().is_empty());
}

#[test]
fn fractional_and_negative_points_rejected() {
    let store = MemoryStore::new();
    let half = SubmittedRow::new("1st", "Bob", Decimal::new(25, 1));
    assert!(matches!(
        merge_results_at(&store, &[half], Utc::now()),
        Err(LeaderboardError::InvalidPoints)
    ));
    assert!(matches!(
        merge_results_at(&store, &[row("1st", "Bob", -3)], Utc::now()),
        Err(LeaderboardError::InvalidPoints)
    ));
}

#[test]
fn duplicate_name_in_batch_rejected() {
    let store = MemoryStore::new();
    let err = merge_results_at(
        &store,
        &[row("1st", "Bob", 10), row("2nd", "Carol", 8), row("3rd", "BOB", 5)],
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, LeaderboardError::DuplicatePlayer));
    assert_eq!(err.to_string(), "A player can only appear once in a single save.");
    assert!(store.load_players().unwrap().is_empty());
}

#[test]
fn missing_name_and_empty_batch_rejected() {
    let store = MemoryStore::new();
    assert!(matches!(
        merge_results_at(&store, &[row("1st", "   ", 10)], Utc::now()),
        Err(LeaderboardError::MissingName)
    ));
    assert!(matches!(
        merge_results_at(&store, &[], Utc::now()),
        Err(LeaderboardError::EmptyBatch)
    ));
}

#[test]
fn first_violation_in_row_order_wins() {
    let store = MemoryStore::new();
    let err = merge_results_at(
        &store,
        &[row("1st", "Bob", 0), row("2nd", "", 8)],
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, LeaderboardError::InvalidPoints));
}

#[test]
fn untouched_players_are_left_alone() {
    let store = MemoryStore::new();
    let then = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    merge_results_at(&store, &[row("1st", "Gus", 7), row("2nd", "Hal", 6)], then).unwrap();
    merge_results_at(&store, &[row("1st", "Hal", 9)], Utc::now()).unwrap();

    let players = players(&store);
    let gus = find(&players, "Gus");
    assert_eq!(gus.points, Decimal::from(7));
    assert_eq!(gus.updated, "2026-01-01T00:00:00Z");
    assert_eq!(find(&players, "Hal").points, Decimal::from(15));
}

#[test]
fn overflowing_total_rejected_without_writes() {
    let store = MemoryStore::new();
    merge_results_at(&store, &[row("1st", "Big", 1)], Utc::now()).unwrap();

    let err = merge_results_at(
        &store,
        &[
            row("1st", "Small", 2),
            SubmittedRow::new("2nd", "big", Decimal::MAX),
        ],
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, LeaderboardError::PointsOverflow));
    assert!(err.is_validation());

    let players = players(&store);
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].points, Decimal::ONE);
}

#[test]
fn later_batches_succeed_after_an_overflow() {
    let board = Leaderboard::new(MemoryStore::new());
    board.submit(&[row("1st", "Big", 1)]).unwrap();
    assert!(board
        .submit(&[SubmittedRow::new("1st", "Big", Decimal::MAX)])
        .is_err());
    assert_eq!(board.submit(&[row("1st", "Other", 3)]).unwrap().processed, 1);
}

#[test]
fn later_batches_succeed_after_a_panicking_store() {
    let board = Leaderboard::new(FailingStore::new(1, Failure::Panic));
    let crashed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        board.submit(&[row("1st", "Ann", 4)])
    }));
    assert!(crashed.is_err());

    assert_eq!(board.submit(&[row("1st", "Ann", 4)]).unwrap().processed, 1);
    let standings = board.standings().unwrap();
    assert_eq!(standings.players.len(), 1);
    assert_eq!(standings.players[0].points, "4");
}

#[test]
fn store_failure_midway_keeps_earlier_rows_and_hides_detail() {
    let store = FailingStore::new(2, Failure::Error);
    let err = merge_results_at(
        &store,
        &[row("1st", "Ann", 5), row("2nd", "Ben", 3), row("3rd", "Cat", 1)],
        Utc::now(),
    )
    .unwrap_err();

    assert!(matches!(err, LeaderboardError::Store(_)));
    assert!(!err.is_validation());
    assert_eq!(err.public_message(), "Failed to save results.");
    assert!(!err.public_message().contains("secret-volume"));
    assert!(err.to_string().contains("secret-volume"));

    let players = store.load_players().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].name, "Ann");
    assert_eq!(players[0].points, Decimal::from(5));
    assert_eq!(players[0].results, "1st");
    // Write attempts stop at the failing row.
    assert_eq!(store.writes.load(Ordering::SeqCst), 2);
}

#[test]
fn validation_messages_are_shown_as_is() {
    assert_eq!(
        LeaderboardError::DuplicatePlayer.public_message(),
        "A player can only appear once in a single save."
    );
}

#[test]
fn case_variant_names_match_last_in_standings_order() {
    let store = MemoryStore::with_rows(
        vec![
            serde_json::json!({"id": "a", "name": "Sam", "points": "3", "results": ""}),
            serde_json::json!({"id": "b", "name": "sam", "points": "10", "results": ""}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect(),
        10,
    );
    merge_results_at(&store, &[row("1st", "SAM", 1)], Utc::now()).unwrap();

    let players = store.load_players().unwrap();
    let upper = players.iter().find(|p| p.id == "a").unwrap();
    let lower = players.iter().find(|p| p.id == "b").unwrap();
    assert_eq!(upper.points, Decimal::from(4));
    assert_eq!(upper.results, "1st");
    assert_eq!(lower.points, Decimal::from(10));
}
