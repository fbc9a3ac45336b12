//! Watchlist Screen: entry normalization and watchlist matching
//!
//! This crate turns raw watchlist data into canonical entries and screens a
//! query person against them.
//!
//! # Example
//!
//! ```
//! use watchlist_screen::{convert_tab_rows, match_entries, MatchPolicy};
//! use watchlist_core::{MatchStatus, QueryPerson};
//!
//! let entries = convert_tab_rows(
//!     "1\tAlice Example\tUS\t01/02/90\tX1\n2\tBob Sample\tUK\t03/04/85\tX2",
//!     1_700_000_000_000,
//! ).unwrap();
//!
//! let result = match_entries(&QueryPerson::named("Alice"), &entries, &MatchPolicy::default());
//! assert_eq!(result.status(), MatchStatus::MatchFound);
//! ```

pub mod batch;
pub mod matcher;
pub mod normalizer;
pub mod records;
pub mod table;

pub use batch::{convert_json_entries, convert_tab_rows, convert_table_rows, placeholder_id};
pub use matcher::{evaluate, match_entries, FieldOutcome, MatchPolicy, PreparedQuery};
pub use normalizer::{extract_id_number, normalize_date};
pub use records::{assemble_working_set, entry_from_record};
pub use table::extract_table_rows;

use thiserror::Error;
use watchlist_core::{WatchlistEntry, WatchlistError};

/// Errors raised while converting a batch into canonical entries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Paste at least one row of tab-separated data before converting")]
    EmptyInput,
    #[error("Line {line} must include at least 5 tab-separated values (ID, Name, Nationality, DOB, ID Number)")]
    TooFewFields { line: usize },
    #[error("Line {line} is missing a name value")]
    MissingName { line: usize },
    #[error("JSON must be an array of entries")]
    NotAnArray,
    #[error("No valid entries found in JSON array")]
    NoUsableEntries,
    #[error("No table found in HTML file")]
    NoTable,
    #[error("No data rows found in table")]
    NoRows,
    #[error("No valid data extracted from table")]
    NoUsableRows,
}

impl From<ImportError> for WatchlistError {
    fn from(err: ImportError) -> Self {
        WatchlistError::MalformedBatch(err.to_string())
    }
}

/// Extract and convert an uploaded sanctions table in one step
pub fn import_sanctions_table(
    html: &str,
    timestamp_millis: i64,
) -> Result<Vec<WatchlistEntry>, ImportError> {
    let rows = extract_table_rows(html)?;
    convert_table_rows(&rows, timestamp_millis)
}
