//! JSON documents in a data directory.
//!
//! Layout:
//! - `watchlist.json`: the bulk watchlist array
//! - `checks_log.json`: the check audit array
//! - `sanctions/<docId>.json`: one document per import batch, with the
//!   uploaded file kept as `sanctions/<docId>.html`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use watchlist_core::{RawDocument, WatchlistEntry};
use watchlist_policy::AuditEntry;

use crate::{demo_watchlist, ImportBatch, StoreError, WatchlistStore};

const WATCHLIST_FILE: &str = "watchlist.json";
const CHECKS_LOG_FILE: &str = "checks_log.json";
const SANCTIONS_DIR: &str = "sanctions";

pub struct JsonFileStore {
    data_dir: PathBuf,
    /// Serialises writers so files are never interleaved
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a data directory, creating and seeding it when needed.
    ///
    /// A missing watchlist is seeded with the demo entries; a missing check
    /// log starts empty.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        let sanctions = data_dir.join(SANCTIONS_DIR);
        tokio::fs::create_dir_all(&sanctions)
            .await
            .map_err(|e| StoreError::io(&sanctions, e))?;

        let store = Self {
            data_dir,
            write_lock: Mutex::new(()),
        };

        let watchlist = store.watchlist_path();
        if !exists(&watchlist).await? {
            tracing::info!(path = %watchlist.display(), "seeding demo watchlist");
            write_json(&watchlist, &demo_watchlist()).await?;
        }
        let log = store.checks_log_path();
        if !exists(&log).await? {
            write_json(&log, &Vec::<AuditEntry>::new()).await?;
        }

        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn watchlist_path(&self) -> PathBuf {
        self.data_dir.join(WATCHLIST_FILE)
    }

    fn checks_log_path(&self) -> PathBuf {
        self.data_dir.join(CHECKS_LOG_FILE)
    }

    fn sanctions_dir(&self) -> PathBuf {
        self.data_dir.join(SANCTIONS_DIR)
    }

    /// Batch documents sorted by file name
    async fn batch_documents(&self) -> Result<Vec<RawDocument>, StoreError> {
        let dir = self.sanctions_dir();
        let mut paths = Vec::new();
        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir, e)),
        };
        while let Some(item) = reader.next_entry().await.map_err(|e| StoreError::io(&dir, e))? {
            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let id = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string();
            let body: Value = read_json(&path).await?;
            documents.push(RawDocument::new(id, body));
        }
        Ok(documents)
    }

    /// Read the check log, treating unreadable content as empty
    async fn read_checks_log(&self) -> Result<Vec<AuditEntry>, StoreError> {
        let path = self.checks_log_path();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(records) => Ok(records
                .into_iter()
                .filter_map(|record| match serde_json::from_value(record) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping malformed check log record");
                        None
                    }
                })
                .collect()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "check log is not a JSON array, treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl WatchlistStore for JsonFileStore {
    async fn fetch_documents(&self) -> Result<Vec<RawDocument>, StoreError> {
        let mut documents = Vec::new();
        let watchlist = self.watchlist_path();
        if exists(&watchlist).await? {
            let entries: Vec<Value> = read_json(&watchlist).await?;
            documents.push(RawDocument::new(
                crate::WATCHLIST_DOC_ID,
                serde_json::json!({ "entries": entries }),
            ));
        }
        documents.extend(self.batch_documents().await?);
        tracing::debug!(documents = documents.len(), "fetched watchlist documents");
        Ok(documents)
    }

    async fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        let watchlist = self.watchlist_path();
        if !exists(&watchlist).await? {
            return Ok(Vec::new());
        }
        read_json(&watchlist).await
    }

    async fn replace_watchlist(&self, entries: &[WatchlistEntry]) -> Result<usize, StoreError> {
        let stored: Vec<WatchlistEntry> = entries
            .iter()
            .cloned()
            .map(WatchlistEntry::without_provenance)
            .collect();

        let _guard = self.write_lock.lock().await;
        write_json(&self.watchlist_path(), &stored).await?;
        tracing::info!(count = stored.len(), "watchlist replaced");
        Ok(stored.len())
    }

    async fn append_batch(&self, batch: &ImportBatch) -> Result<String, StoreError> {
        let id = batch.document_id();
        let dir = self.sanctions_dir();

        let _guard = self.write_lock.lock().await;
        if let Some(html) = &batch.source_html {
            let html_path = dir.join(format!("{}.html", id));
            tokio::fs::write(&html_path, html)
                .await
                .map_err(|e| StoreError::io(&html_path, e))?;
        }
        write_json(&dir.join(format!("{}.json", id)), &batch.to_document()).await?;

        tracing::info!(doc_id = %id, entries = batch.entries.len(), "import batch stored");
        Ok(id)
    }

    async fn append_check(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut log = self.read_checks_log().await?;
        log.push(entry.clone());
        write_json(&self.checks_log_path(), &log).await
    }

    async fn check_history(&self) -> Result<Vec<AuditEntry>, StoreError> {
        self.read_checks_log().await
    }
}

async fn exists(path: &Path) -> Result<bool, StoreError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Write through a temporary file so readers never see a partial document
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_seeds_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        assert!(dir.path().join(WATCHLIST_FILE).exists());
        assert!(dir.path().join(CHECKS_LOG_FILE).exists());
        assert!(dir.path().join(SANCTIONS_DIR).is_dir());
        assert_eq!(store.load_watchlist().await.unwrap().len(), 2);
        assert!(store.check_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_keeps_existing_watchlist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(WATCHLIST_FILE), "[]").unwrap();

        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert!(store.load_watchlist().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        std::fs::write(dir.path().join(CHECKS_LOG_FILE), "{ not json").unwrap();
        assert!(store.check_history().await.unwrap().is_empty());

        std::fs::write(dir.path().join(CHECKS_LOG_FILE), r#"{"a": 1}"#).unwrap();
        assert!(store.check_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_watchlist_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join(WATCHLIST_FILE), "oops").unwrap();

        let err = store.fetch_documents().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}
