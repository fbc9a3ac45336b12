//! Watchlist Core: canonical data model shared by every watchlist crate
//!
//! Holds the canonical [`WatchlistEntry`], the [`QueryPerson`] submitted for a
//! check, the tagged [`MatchResult`] returned to callers, and the error taxonomy.

pub mod context;
pub mod data_model;
pub mod error;

pub use context::CheckContext;
pub use data_model::{
    has_value, MatchResult, MatchStatus, QueryPerson, RawDocument, WatchlistEntry,
    NOT_AVAILABLE,
};
pub use error::WatchlistError;

/// Engine version reported by the health endpoint
pub const WATCHLIST_VERSION: &str = "1.0.0";
