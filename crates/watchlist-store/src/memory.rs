use async_trait::async_trait;
use std::sync::RwLock;
use watchlist_core::{RawDocument, WatchlistEntry};
use watchlist_policy::AuditEntry;

use crate::{watchlist_document, ImportBatch, StoreError, WatchlistStore};

#[derive(Default)]
struct Inner {
    watchlist: Vec<WatchlistEntry>,
    batches: Vec<RawDocument>,
    extra: Vec<RawDocument>,
    checks: Vec<AuditEntry>,
}

/// In-memory WatchlistStore for testing and demos.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Store preloaded with the demo watchlist
    pub fn seeded() -> Self {
        Self::with_watchlist(crate::demo_watchlist())
    }

    pub fn with_watchlist(entries: Vec<WatchlistEntry>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.write() {
            inner.watchlist = entries;
        }
        store
    }

    /// Add a raw document as-is, e.g. a legacy single-entry document
    pub fn with_document(self, document: RawDocument) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.extra.push(document);
        }
        self
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Lock(e.to_string())
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn fetch_documents(&self) -> Result<Vec<RawDocument>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut documents = vec![watchlist_document(&inner.watchlist)?];
        documents.extend(inner.batches.iter().cloned());
        documents.extend(inner.extra.iter().cloned());
        Ok(documents)
    }

    async fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.watchlist.clone())
    }

    async fn replace_watchlist(&self, entries: &[WatchlistEntry]) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.watchlist = entries
            .iter()
            .cloned()
            .map(WatchlistEntry::without_provenance)
            .collect();
        Ok(inner.watchlist.len())
    }

    async fn append_batch(&self, batch: &ImportBatch) -> Result<String, StoreError> {
        let id = batch.document_id();
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.batches.retain(|doc| doc.id != id);
        inner.batches.push(RawDocument::new(id.clone(), batch.to_document()));
        Ok(id)
    }

    async fn append_check(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.checks.push(entry.clone());
        Ok(())
    }

    async fn check_history(&self) -> Result<Vec<AuditEntry>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.checks.clone())
    }
}
