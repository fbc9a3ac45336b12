//! Import batches persisted as standalone documents.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use watchlist_core::WatchlistEntry;

/// Length of the hex document id derived from the batch content
const DOC_ID_LEN: usize = 20;

/// A set of entries imported together from one uploaded file
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub file_name: String,
    pub entries: Vec<WatchlistEntry>,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
    /// Uploaded document, kept next to the extracted entries
    pub source_html: Option<String>,
}

impl ImportBatch {
    pub fn new(file_name: impl Into<String>, entries: Vec<WatchlistEntry>) -> Self {
        Self {
            file_name: file_name.into(),
            entries,
            uploaded_at: Utc::now(),
            uploaded_by: None,
            source_html: None,
        }
    }

    pub fn with_source_html(mut self, html: impl Into<String>) -> Self {
        self.source_html = Some(html.into());
        self
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploaded_by = Some(uploader.into());
        self
    }

    pub fn with_uploaded_at(mut self, uploaded_at: DateTime<Utc>) -> Self {
        self.uploaded_at = uploaded_at;
        self
    }

    /// Content hash over file name, upload time and entries.
    ///
    /// Re-importing the same file at a different time yields a new document.
    pub fn document_id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.file_name.as_bytes());
        hasher.update(&self.uploaded_at.timestamp_millis().to_le_bytes());
        for entry in &self.entries {
            hasher.update(entry.id.as_bytes());
            hasher.update(&[0]);
            hasher.update(entry.name.as_bytes());
            hasher.update(&[0]);
            hasher.update(entry.id_number.as_bytes());
            hasher.update(&[0xff]);
        }
        let hex = hasher.finalize().to_hex();
        hex.as_str()[..DOC_ID_LEN].to_string()
    }

    /// Persisted document body
    pub fn to_document(&self) -> Value {
        let entries: Vec<WatchlistEntry> = self
            .entries
            .iter()
            .cloned()
            .map(WatchlistEntry::without_provenance)
            .collect();

        json!({
            "entries": entries,
            "entriesCount": entries.len(),
            "htmlFileName": self.file_name,
            "fileSize": self.source_html.as_ref().map(|html| html.len()),
            "uploadedBy": self.uploaded_by.as_deref().unwrap_or("unknown"),
            "uploadedAt": self.uploaded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> ImportBatch {
        let uploaded_at = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        ImportBatch::new(
            "list.html",
            vec![WatchlistEntry::new("ENTRY-1-1", "Ali Example").with_provenance("old", Some(3))],
        )
        .with_uploaded_at(uploaded_at)
    }

    #[test]
    fn test_document_id_is_stable() {
        let id = batch().document_id();
        assert_eq!(id.len(), DOC_ID_LEN);
        assert_eq!(id, batch().document_id());
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_document_id_depends_on_content() {
        let mut other = batch();
        other.entries[0].name = "Someone Else".to_string();
        assert_ne!(other.document_id(), batch().document_id());
    }

    #[test]
    fn test_document_body() {
        let doc = batch().with_source_html("<table></table>").to_document();
        assert_eq!(doc["entriesCount"], 1);
        assert_eq!(doc["htmlFileName"], "list.html");
        assert_eq!(doc["fileSize"], 15);
        assert_eq!(doc["uploadedBy"], "unknown");
        assert_eq!(doc["uploadedAt"], "2024-03-01T10:00:00.000Z");
        assert!(doc["entries"][0].get("sourceDocId").is_none());
    }
}
