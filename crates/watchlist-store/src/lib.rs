//! Watchlist Store: persistence for the screening service
//!
//! The [`WatchlistStore`] trait is the only way the service touches stored
//! data. Two backends are provided:
//!
//! - [`JsonFileStore`]: JSON documents in a data directory
//! - [`MemoryStore`]: in-process, for tests and demos
//!
//! Errors are surfaced verbatim. There are no retries and the last writer wins.

mod batch;
mod error;
mod file;
mod memory;

pub use batch::ImportBatch;
pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use watchlist_core::{RawDocument, WatchlistEntry};
use watchlist_policy::AuditEntry;

/// Document id of the bulk-replaced watchlist
pub const WATCHLIST_DOC_ID: &str = "watchlist";

#[async_trait]
pub trait WatchlistStore: Send + Sync {
    // ── Screening ──

    /// Every persisted watchlist document, in either shape
    async fn fetch_documents(&self) -> Result<Vec<RawDocument>, StoreError>;

    // ── Bulk watchlist ──

    async fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StoreError>;

    /// Replace the bulk watchlist and return the number of stored entries
    async fn replace_watchlist(&self, entries: &[WatchlistEntry]) -> Result<usize, StoreError>;

    // ── Import batches ──

    /// Persist a batch as its own document and return the document id
    async fn append_batch(&self, batch: &ImportBatch) -> Result<String, StoreError>;

    // ── Check log ──

    async fn append_check(&self, entry: &AuditEntry) -> Result<(), StoreError>;

    /// Recorded checks, oldest first
    async fn check_history(&self) -> Result<Vec<AuditEntry>, StoreError>;
}

/// Demo entries written to an empty data directory
pub fn demo_watchlist() -> Vec<WatchlistEntry> {
    vec![
        WatchlistEntry::new("DEMO-001", "John Demo")
            .with_date_of_birth("1980-01-15")
            .with_nationality("US")
            .with_id_type("Passport")
            .with_id_number("P123456")
            .with_notes("Fake example only - DEMO DATA"),
        WatchlistEntry::new("DEMO-002", "Jane Smith")
            .with_date_of_birth("1975-05-20")
            .with_nationality("UK")
            .with_id_type("National ID")
            .with_id_number("UK789012")
            .with_notes("Fake example only - DEMO DATA"),
    ]
}

/// Wrap the bulk watchlist as a batch-shaped document
pub(crate) fn watchlist_document(entries: &[WatchlistEntry]) -> Result<RawDocument, StoreError> {
    let body = serde_json::json!({ "entries": serde_json::to_value(entries)? });
    Ok(RawDocument::new(WATCHLIST_DOC_ID, body))
}
