//! Leaderboard business logic: points, ranking, results merge.

mod merge;
pub mod points;
mod ranking;

pub use merge::{
    append_result, merge_results, merge_results_at, name_key, validate_batch, MergeSummary,
};
pub use points::{format_points, parse_points};
pub use ranking::{compare_players, ordinal, rank_label, rank_players, sort_players, RankedPlayer};
