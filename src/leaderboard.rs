//! Leaderboard service: the read and write paths over one player store.

use crate::logic::{merge_results, rank_players, MergeSummary, RankedPlayer};
use crate::models::{LeaderboardError, Player, SubmittedRow};
use crate::store::{PlayerStore, StoreError};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Ranked players plus the date of the most recent change.
#[derive(Clone, Debug, Serialize)]
pub struct Standings {
    /// `M/D/YYYY`, or `Unknown` when no player has a readable timestamp.
    pub updated: String,
    pub players: Vec<RankedPlayer>,
}

impl Standings {
    pub fn from_players(players: Vec<Player>) -> Self {
        let updated = latest_updated_text(&players);
        Self {
            updated,
            players: rank_players(players),
        }
    }
}

/// The store plus a single writer gate: batches are merged one at a time so a
/// read-then-write in one batch never interleaves with another in this process.
pub struct Leaderboard {
    store: Box<dyn PlayerStore>,
    writer: Mutex<()>,
}

impl Leaderboard {
    pub fn new(store: impl PlayerStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            writer: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &dyn PlayerStore {
        self.store.as_ref()
    }

    /// Load every player and rank them.
    pub fn standings(&self) -> Result<Standings, StoreError> {
        let players = self.store.load_players()?;
        log::info!("Loaded {} players for standings.", players.len());
        Ok(Standings::from_players(players))
    }

    /// Validate and merge one batch of results.
    pub fn submit(&self, rows: &[SubmittedRow]) -> Result<MergeSummary, LeaderboardError> {
        // The gate guards no data, so a panic in an earlier batch leaves nothing to repair.
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        merge_results(self.store.as_ref(), rows)
    }
}

/// Date of the newest parseable `updated` among `players`, as `M/D/YYYY`.
pub fn latest_updated_text(players: &[Player]) -> String {
    use chrono::Datelike;
    players
        .iter()
        .filter_map(Player::updated_at)
        .max()
        .map(|at| format!("{}/{}/{}", at.month(), at.day(), at.year()))
        .unwrap_or_else(|| "Unknown".to_string())
}
