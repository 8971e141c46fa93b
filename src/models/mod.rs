//! Data structures for the leaderboard: players, submitted rows, errors.

mod error;
mod player;
mod submission;

pub use error::LeaderboardError;
pub use player::{parse_timestamp, timestamp, Player, PlayerId, PlayerUpdate, RawRow};
pub use submission::{parse_batch, SubmittedRow, NO_PLACE};
