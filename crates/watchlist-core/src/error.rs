//! Unified Error Model
use thiserror::Error;

/// Error taxonomy shared across the watchlist crates.
///
/// Messages are shown to the operator verbatim, so they stay actionable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistError {
    /// Missing or malformed query field
    #[error("{0}")]
    InvalidQuery(String),

    /// Malformed import batch
    #[error("{0}")]
    MalformedBatch(String),

    /// Read or write against the persisted collection failed
    #[error("{0}")]
    Persistence(String),

    /// Certificate could not be produced
    #[error("{0}")]
    Render(String),
}

impl WatchlistError {
    /// Short code used in logs and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            WatchlistError::InvalidQuery(_) => "INPUT",
            WatchlistError::MalformedBatch(_) => "BATCH",
            WatchlistError::Persistence(_) => "STORE",
            WatchlistError::Render(_) => "RENDER",
        }
    }

    /// True for errors the caller can fix by changing the input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WatchlistError::InvalidQuery(_) | WatchlistError::MalformedBatch(_)
        )
    }
}
