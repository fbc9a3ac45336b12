//! Query validation run before any scan.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use watchlist_core::{QueryPerson, WatchlistError};

/// Reasons a query is refused before matching
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Enter a name, ID number or nationality to check")]
    Empty,
    #[error("Full name is required")]
    MissingFullName,
}

impl From<QueryError> for WatchlistError {
    fn from(err: QueryError) -> Self {
        WatchlistError::InvalidQuery(err.to_string())
    }
}

/// Acceptance rules for incoming queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPolicy {
    /// Refuse queries that carry no full name
    pub require_full_name: bool,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            require_full_name: true,
        }
    }
}

impl QueryPolicy {
    pub fn validate(&self, person: &QueryPerson) -> Result<(), QueryError> {
        if person.is_empty() {
            return Err(QueryError::Empty);
        }
        if self.require_full_name && person.name().is_none() {
            return Err(QueryError::MissingFullName);
        }
        Ok(())
    }
}
