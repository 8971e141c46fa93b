//! Results merge: validate a batch, then fold each row into the stored players.

use crate::logic::points::is_positive_whole;
use crate::logic::ranking::sort_players;
use crate::models::{timestamp, LeaderboardError, Player, PlayerUpdate, SubmittedRow};
use crate::store::PlayerStore;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Outcome of a successful merge.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MergeSummary {
    pub processed: usize,
}

/// Key used to match names: case-insensitive, surrounding whitespace ignored.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Check the whole batch before anything is written.
///
/// Rows are scanned in order and the first problem found is returned.
pub fn validate_batch(rows: &[SubmittedRow]) -> Result<(), LeaderboardError> {
    if rows.is_empty() {
        return Err(LeaderboardError::EmptyBatch);
    }
    let mut seen = HashSet::new();
    for row in rows {
        if row.name.trim().is_empty() {
            return Err(LeaderboardError::MissingName);
        }
        if !is_positive_whole(row.points) {
            return Err(LeaderboardError::InvalidPoints);
        }
        if !seen.insert(name_key(&row.name)) {
            return Err(LeaderboardError::DuplicatePlayer);
        }
    }
    Ok(())
}

/// Results history with `place` appended, unless `place` is the no-place sentinel.
pub fn append_result(current: &str, row: &SubmittedRow) -> String {
    let current = current.trim();
    if row.has_no_place() {
        current.to_string()
    } else if current.is_empty() {
        row.place.clone()
    } else {
        format!("{},{}", current, row.place)
    }
}

/// Merge a batch into the store, stamping changes with the current time.
pub fn merge_results(
    store: &dyn PlayerStore,
    rows: &[SubmittedRow],
) -> Result<MergeSummary, LeaderboardError> {
    merge_results_at(store, rows, Utc::now())
}

/// One store write worked out before anything is written.
enum Write {
    Create(Player),
    Update { player: Player, update: PlayerUpdate },
}

/// Merge a batch into the store, stamping changes with `now`.
///
/// The batch is validated and every new total computed before the first
/// write, so a bad batch (including one whose totals would overflow) writes
/// nothing. Rows are then applied in order with one store write each; a store
/// failure midway leaves earlier rows written.
pub fn merge_results_at(
    store: &dyn PlayerStore,
    rows: &[SubmittedRow],
    now: DateTime<Utc>,
) -> Result<MergeSummary, LeaderboardError> {
    validate_batch(rows)?;
    log::info!("Starting results merge for {} row(s).", rows.len());

    let now = now.trunc_subsecs(0);
    let updated = timestamp(now);

    // Built in standings order so that, of stored names differing only by case,
    // the last one in the standings is matched.
    let mut players = store.load_players()?;
    sort_players(&mut players);
    let mut lookup: HashMap<String, Player> = players
        .into_iter()
        .filter(|p| !p.name.trim().is_empty())
        .map(|p| (name_key(&p.name), p))
        .collect();

    let mut writes = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        log::info!(
            "Processing row {}: player='{}', place='{}', points='{}'.",
            index + 1,
            row.name,
            row.place,
            row.points
        );
        let key = name_key(&row.name);
        let write = match lookup.get_mut(&key) {
            Some(existing) => {
                let points = existing
                    .points
                    .checked_add(row.points)
                    .ok_or(LeaderboardError::PointsOverflow)?;
                let update = PlayerUpdate {
                    points,
                    results: append_result(&existing.results, row),
                    updated: updated.clone(),
                };
                existing.apply(&update);
                Write::Update {
                    player: existing.clone(),
                    update,
                }
            }
            None => {
                let player = Player::new(row.name.clone(), row.points, append_result("", row), now);
                lookup.insert(key, player.clone());
                Write::Create(player)
            }
        };
        writes.push(write);
    }

    let mut processed = 0;
    for write in &writes {
        match write {
            Write::Update { player, update } => {
                log::info!(
                    "Updating existing player id='{}' name='{}' -> points='{}', results='{}'.",
                    player.id,
                    player.name,
                    update.points,
                    update.results
                );
                store.update(&player.id, update)?;
            }
            Write::Create(player) => {
                log::info!(
                    "Creating new player id='{}' name='{}' with points='{}' and results='{}'.",
                    player.id,
                    player.name,
                    player.points,
                    player.results
                );
                store.put(player)?;
            }
        }
        processed += 1;
    }

    log::info!("Results merge complete. Processed {} row(s).", processed);
    Ok(MergeSummary { processed })
}
