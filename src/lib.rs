//! Poker series leaderboard: library with models, ranking/merge logic, storage and rendering.

pub mod leaderboard;
pub mod logic;
pub mod models;
pub mod render;
pub mod store;

pub use leaderboard::{latest_updated_text, Leaderboard, Standings};
pub use logic::{
    format_points, merge_results, merge_results_at, ordinal, parse_points, rank_players,
    MergeSummary, RankedPlayer,
};
pub use models::{parse_batch, LeaderboardError, Player, PlayerId, PlayerUpdate, RawRow, SubmittedRow};
pub use store::{FileStore, MemoryStore, PlayerStore, StoreError};
