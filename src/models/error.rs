//! Errors surfaced to callers when reading or saving results.

use crate::store::StoreError;

/// Errors that can occur while parsing, validating or merging a results batch.
#[derive(Debug)]
pub enum LeaderboardError {
    /// Body was not an array, or the array was empty.
    EmptyBatch,
    /// Body could not be decoded (invalid JSON, base64 or UTF-8).
    InvalidBody,
    /// A row was not a JSON object.
    RowNotObject,
    /// A row had a blank player name.
    MissingName,
    /// A row's points were zero, negative, fractional or not a number.
    InvalidPoints,
    /// The same player (case-insensitive) appeared twice in one batch.
    DuplicatePlayer,
    /// A player's new total would exceed what a decimal can hold.
    PointsOverflow,
    /// The store failed while loading or writing.
    Store(StoreError),
}

impl LeaderboardError {
    /// Client-side errors: the batch itself is at fault and nothing was written.
    pub fn is_validation(&self) -> bool {
        !matches!(self, LeaderboardError::Store(_))
    }

    /// Message safe to show callers: validation text as is, store failures without backend detail.
    pub fn public_message(&self) -> String {
        match self {
            LeaderboardError::Store(_) => "Failed to save results.".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderboardError::EmptyBatch => write!(f, "Request body must be a non-empty array of results."),
            LeaderboardError::InvalidBody => write!(f, "Invalid JSON request body."),
            LeaderboardError::RowNotObject => write!(f, "Each result row must be an object."),
            LeaderboardError::MissingName => write!(f, "Each result row must include a player name."),
            LeaderboardError::InvalidPoints => {
                write!(f, "Each result row must include whole-number points greater than 0.")
            }
            LeaderboardError::DuplicatePlayer => write!(f, "A player can only appear once in a single save."),
            LeaderboardError::PointsOverflow => write!(f, "Points total is too large."),
            LeaderboardError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for LeaderboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaderboardError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for LeaderboardError {
    fn from(e: StoreError) -> Self {
        LeaderboardError::Store(e)
    }
}
