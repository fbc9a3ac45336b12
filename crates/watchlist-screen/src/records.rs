//! Record resolution for loosely shaped watchlist data.
//!
//! Persisted and uploaded records come in several shapes:
//! - canonical entries (`id` + `idNumber` + `dateOfBirth`)
//! - table extracts (`id` holds the identifying number, `birth` the date)
//! - legacy single-entry documents
//!
//! Everything is resolved here so the matcher only ever sees [`WatchlistEntry`].

use crate::normalizer::normalize_date;
use serde_json::{Map, Value};
use watchlist_core::{RawDocument, WatchlistEntry, NOT_AVAILABLE};

/// Resolve one loosely shaped record into a canonical entry.
///
/// Returns `None` when the record is not an object or carries no name.
/// `fallback_id` is only called when the record has no opaque id.
pub fn entry_from_record<F>(record: &Value, fallback_id: F) -> Option<WatchlistEntry>
where
    F: FnOnce() -> String,
{
    let fields = record.as_object()?;
    resolve(fields, is_table_shape(fields), fallback_id)
}

/// Resolve a legacy single-entry document.
///
/// Legacy documents carry the identifying number in `id` whenever `idNumber`
/// is absent; the document id then identifies the entry.
fn legacy_entry(document: &RawDocument) -> Option<WatchlistEntry> {
    let fields = document.body.as_object()?;
    let id_in_id_field = !fields.contains_key("idNumber");
    resolve(fields, id_in_id_field, || document.id.clone())
}

fn resolve<F>(
    fields: &Map<String, Value>,
    id_is_number: bool,
    fallback_id: F,
) -> Option<WatchlistEntry>
where
    F: FnOnce() -> String,
{
    let name = text(fields, "name").or_else(|| text(fields, "fullName"))?;

    let (id, id_number) = if id_is_number {
        (None, text(fields, "id"))
    } else {
        (text(fields, "id"), text(fields, "idNumber"))
    };

    let date_of_birth = text(fields, "dateOfBirth")
        .or_else(|| text(fields, "birth"))
        .map(|raw| normalize_date(&raw));

    let mut entry = WatchlistEntry::new(id.unwrap_or_else(fallback_id), name)
        .with_nationality(or_sentinel(text(fields, "nationality")))
        .with_date_of_birth(or_sentinel(date_of_birth))
        .with_id_type(or_sentinel(text(fields, "idType")))
        .with_id_number(or_sentinel(id_number));
    entry.notes = text(fields, "notes");

    Some(entry)
}

/// Table extracts carry `birth` and use `id` for the identifying number
fn is_table_shape(fields: &Map<String, Value>) -> bool {
    !fields.contains_key("idNumber") && fields.contains_key("birth")
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match fields.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!value.is_empty()).then_some(value)
}

fn or_sentinel(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Build the working set for one check from every persisted document.
///
/// Batch documents contribute each element of `entries` tagged with the
/// document id and its index; legacy documents contribute themselves.
/// Documents with neither shape are ignored.
pub fn assemble_working_set(documents: &[RawDocument]) -> Vec<WatchlistEntry> {
    let mut working_set = Vec::new();

    for document in documents {
        match document.body.get("entries").and_then(Value::as_array) {
            Some(records) => {
                for (index, record) in records.iter().enumerate() {
                    let fallback = || format!("{}-{}", document.id, index + 1);
                    match entry_from_record(record, fallback) {
                        Some(entry) => {
                            working_set.push(entry.with_provenance(&document.id, Some(index)))
                        }
                        None => tracing::warn!(
                            doc_id = %document.id,
                            index,
                            "skipping watchlist record without a name"
                        ),
                    }
                }
            }
            None if is_legacy_entry(&document.body) => {
                match legacy_entry(document) {
                    Some(entry) => working_set.push(entry.with_provenance(&document.id, None)),
                    None => tracing::warn!(
                        doc_id = %document.id,
                        "skipping legacy watchlist document without a name"
                    ),
                }
            }
            None => tracing::debug!(doc_id = %document.id, "ignoring non-watchlist document"),
        }
    }

    working_set
}

fn is_legacy_entry(body: &Value) -> bool {
    body.get("name").is_some() || body.get("id").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_record() {
        let record = json!({
            "id": "DEMO-001",
            "name": "John Demo",
            "dateOfBirth": "15/01/1980",
            "nationality": "US",
            "idType": "Passport",
            "idNumber": "P123456",
            "notes": "example"
        });

        let entry = entry_from_record(&record, || unreachable!()).unwrap();
        assert_eq!(entry.id, "DEMO-001");
        assert_eq!(entry.date_of_birth, "1980-01-15");
        assert_eq!(entry.id_number, "P123456");
        assert_eq!(entry.notes.as_deref(), Some("example"));
    }

    #[test]
    fn test_table_shape_record() {
        let record = json!({
            "name": "Ali Example",
            "nationality": "N/A",
            "birth": "01/02/1970",
            "id": "Civil ID: 0307092900239"
        });

        let entry = entry_from_record(&record, || "doc-1".to_string()).unwrap();
        assert_eq!(entry.id, "doc-1");
        assert_eq!(entry.id_number, "Civil ID: 0307092900239");
        assert_eq!(entry.date_of_birth, "1970-02-01");
        assert_eq!(entry.id_type, NOT_AVAILABLE);
    }

    #[test]
    fn test_record_without_name() {
        assert!(entry_from_record(&json!({ "id": "7" }), || "x".into()).is_none());
        assert!(entry_from_record(&json!({ "name": "   " }), || "x".into()).is_none());
        assert!(entry_from_record(&json!("Alice"), || "x".into()).is_none());
    }

    #[test]
    fn test_numeric_fields() {
        let entry = entry_from_record(&json!({ "id": 12, "name": "Num", "idNumber": 345 }), || {
            "x".into()
        })
        .unwrap();
        assert_eq!(entry.id, "12");
        assert_eq!(entry.id_number, "345");
    }

    #[test]
    fn test_assemble_both_shapes() {
        let documents = vec![
            RawDocument::new(
                "abc123",
                json!({
                    "entries": [
                        { "name": "Alice Example", "birth": "N/A", "id": "111" },
                        { "birth": "N/A", "id": "222" },
                        { "name": "Bob Sample", "birth": "N/A", "id": "333" }
                    ],
                    "entriesCount": 3
                }),
            ),
            RawDocument::new("legacy-1", json!({ "name": "Carol Legacy", "id": "444" })),
            RawDocument::new("test", json!({ "ping": true })),
        ];

        let entries = assemble_working_set(&documents);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].source_doc_id.as_deref(), Some("abc123"));
        assert_eq!(entries[0].entry_index, Some(0));
        assert_eq!(entries[1].name, "Bob Sample");
        assert_eq!(entries[1].entry_index, Some(2));

        assert_eq!(entries[2].source_doc_id.as_deref(), Some("legacy-1"));
        assert_eq!(entries[2].entry_index, None);
        assert_eq!(entries[2].id, "legacy-1");
        assert_eq!(entries[2].id_number, "444");
    }

    #[test]
    fn test_legacy_document_with_explicit_id_number() {
        let documents = vec![RawDocument::new(
            "legacy-2",
            json!({ "id": "L-7", "name": "Dan Legacy", "idNumber": "Civil ID: 0555" }),
        )];
        let entries = assemble_working_set(&documents);
        assert_eq!(entries[0].id, "L-7");
        assert_eq!(entries[0].id_number, "Civil ID: 0555");
    }
}
