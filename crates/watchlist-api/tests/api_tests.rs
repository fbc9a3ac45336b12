//! End-to-end tests for the HTTP surface, backed by the in-memory store.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use watchlist_api::{create_app, AppState, ServiceConfig};
use watchlist_core::{RawDocument, WatchlistEntry};
use watchlist_out::CertificateRenderer;
use watchlist_policy::AuditEntry;
use watchlist_store::{ImportBatch, MemoryStore, StoreError, WatchlistStore};

fn app_with(store: Arc<dyn WatchlistStore>) -> Router {
    let renderer = CertificateRenderer::embedded().unwrap();
    let state = AppState::new(store, renderer, ServiceConfig::default()).unwrap();
    create_app(state)
}

fn seeded() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::seeded());
    (app_with(store.clone()), store)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Demo-seeded store whose check log rejects writes, and optionally reads
struct FailingStore {
    inner: MemoryStore,
    fail_reads: bool,
}

impl FailingStore {
    fn new(fail_reads: bool) -> Self {
        Self {
            inner: MemoryStore::seeded(),
            fail_reads,
        }
    }
}

#[async_trait]
impl WatchlistStore for FailingStore {
    async fn fetch_documents(&self) -> Result<Vec<RawDocument>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Other("watchlist unavailable".to_string()));
        }
        self.inner.fetch_documents().await
    }

    async fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        self.inner.load_watchlist().await
    }

    async fn replace_watchlist(&self, entries: &[WatchlistEntry]) -> Result<usize, StoreError> {
        self.inner.replace_watchlist(entries).await
    }

    async fn append_batch(&self, batch: &ImportBatch) -> Result<String, StoreError> {
        self.inner.append_batch(batch).await
    }

    async fn append_check(&self, _entry: &AuditEntry) -> Result<(), StoreError> {
        Err(StoreError::Other("check log is read-only".to_string()))
    }

    async fn check_history(&self) -> Result<Vec<AuditEntry>, StoreError> {
        self.inner.check_history().await
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn read_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const SANCTIONS_HTML: &str = "<table><thead><tr><th>#</th><th>Name</th></tr></thead><tbody>\
    <tr><td>1</td><td>Ali Example</td><td>Kuwaiti</td><td>01/02/70</td><td>Civil ID: 0307</td></tr>\
    <tr><td>2</td><td>Omar Sample</td><td></td><td>unknown</td><td></td></tr>\
    </tbody></table>";

// =============================================================================
// Health and Metrics
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = seeded();
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-trace-id"));

    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], watchlist_core::WATCHLIST_VERSION);
}

#[tokio::test]
async fn test_metrics_count_checks() {
    let (app, _) = seeded();
    app.clone()
        .oneshot(json_request("POST", "/api/check-person", json!({ "fullName": "John Demo" })))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = read_text(response).await;
    assert!(text.contains("watchlist_checks_total{status=\"MATCH_FOUND\"} 1"));
}

// =============================================================================
// Checks
// =============================================================================

#[tokio::test]
async fn test_check_person_match_found() {
    let (app, store) = seeded();
    let response = app
        .oneshot(json_request("POST", "/api/check-person", json!({ "fullName": "john demo" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "MATCH_FOUND");
    assert_eq!(body["totalEntriesChecked"], 2);
    assert_eq!(body["matches"][0]["id"], "DEMO-001");
    assert_eq!(body["matches"][0]["sourceDocId"], "watchlist");

    let history = store.check_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].matches, 1);
}

#[tokio::test]
async fn test_check_person_no_match_records_operator() {
    let (app, store) = seeded();
    let request = Request::builder()
        .method("POST")
        .uri("/api/check-person")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-operator", "analyst-7")
        .body(Body::from(json!({ "fullName": "Zed Nomatch" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "NO_MATCH");

    let history = store.check_history().await.unwrap();
    assert_eq!(history[0].operator.as_deref(), Some("analyst-7"));
}

#[tokio::test]
async fn test_check_person_requires_name() {
    let (app, store) = seeded();
    let response = app
        .oneshot(json_request("POST", "/api/check-person", json!({ "idNumber": "P123456" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["error"], "Full name is required");
    assert!(store.check_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_check_history_filters_newest_first() {
    let (app, _) = seeded();
    for name in ["John Demo", "Jane Smith", "John Other"] {
        app.clone()
            .oneshot(json_request("POST", "/api/check-person", json!({ "fullName": name })))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(Request::get("/api/check-history?query=JOHN").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = read_json(response).await;
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["stats"]["matched"], 2);
    assert_eq!(body["stats"]["clear"], 1);
    assert_eq!(history[0]["input"]["fullName"], "John Other");
    assert_eq!(history[1]["input"]["fullName"], "John Demo");

    let response = app
        .oneshot(Request::get("/api/check-history").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(read_json(response).await["history"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_check_survives_audit_failure() {
    let app = app_with(Arc::new(FailingStore::new(false)));
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/check-person", json!({ "fullName": "John Demo" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "MATCH_FOUND");

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let text = read_text(response).await;
    assert!(text.contains("watchlist_audit_failures_total 1"));
    assert!(text.contains("watchlist_checks_total{status=\"MATCH_FOUND\"} 1"));
}

#[tokio::test]
async fn test_check_with_unreadable_store() {
    let app = app_with(Arc::new(FailingStore::new(true)));
    let response = app
        .oneshot(json_request("POST", "/api/check-person", json!({ "fullName": "John Demo" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ERROR");
    assert!(body["error"].as_str().unwrap().contains("watchlist unavailable"));
}

#[tokio::test]
async fn test_malformed_body_gets_error_notice() {
    let (app, _) = seeded();
    let request = Request::builder()
        .method("POST")
        .uri("/api/check-person")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["type"], "error");
    assert!(!body["text"].as_str().unwrap().is_empty());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/generate-certificate",
            json!({ "person": "Jane Smith" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["type"], "error");
}

// =============================================================================
// Certificates
// =============================================================================

#[tokio::test]
async fn test_certificate_issued_for_clear_person() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/generate-certificate",
            json!({
                "person": { "fullName": "Clear Person", "nationality": "Kuwaiti" },
                "timestamp": "2024-03-05T10:00:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
    let number = headers["x-certificate-number"].to_str().unwrap().to_string();
    assert!(number.starts_with("CERT-"));
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains(&format!("clearance-certificate-{}.html", number)));

    let html = read_text(response).await;
    assert!(html.contains("Clear Person"));
    assert!(html.contains("March 5, 2024"));
}

#[tokio::test]
async fn test_certificate_withheld_on_match() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/generate-certificate",
            json!({ "person": { "fullName": "Jane Smith" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = read_json(response).await;
    assert_eq!(body["type"], "error");
    assert!(body["text"].as_str().unwrap().starts_with("Certificate withheld"));
}

#[tokio::test]
async fn test_certificate_input_errors() {
    let (app, _) = seeded();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/generate-certificate", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["text"], "Person data is required");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/generate-certificate",
            json!({ "person": { "nationality": "US" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["text"], "Person full name is required");
}

// =============================================================================
// Watchlist Maintenance
// =============================================================================

#[tokio::test]
async fn test_get_and_replace_watchlist() {
    let (app, _) = seeded();
    let response = app
        .clone()
        .oneshot(Request::get("/api/watchlist").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(read_json(response).await["watchlist"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/watchlist",
            json!({ "watchlist": [{ "name": "Only Entry", "idNumber": "Z1" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);

    let response = app
        .oneshot(json_request("POST", "/api/check-person", json!({ "fullName": "John Demo" })))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["status"], "NO_MATCH");
    assert_eq!(body["totalEntriesChecked"], 1);
}

#[tokio::test]
async fn test_replace_watchlist_requires_array() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request("PUT", "/api/watchlist", json!({ "watchlist": { "name": "x" } })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["text"], "Watchlist must be an array of entries");
}

#[tokio::test]
async fn test_convert_appends_to_base() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/watchlist/convert",
            json!({
                "text": "9\tNew Person\tUS\t01/02/90\tX9",
                "base": [{ "id": "DEMO-001", "name": "John Demo" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["type"], "success");
    assert!(body["text"].as_str().unwrap().starts_with("Converted 1 row."));
    let watchlist = body["watchlist"].as_array().unwrap();
    assert_eq!(watchlist.len(), 2);
    assert_eq!(watchlist[1]["dateOfBirth"], "1990-02-01");
}

#[tokio::test]
async fn test_convert_rejects_short_rows() {
    let (app, _) = seeded();
    let response = app
        .oneshot(json_request("POST", "/api/watchlist/convert", json!({ "text": "1\tAli\tUS" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["type"], "error");
}

// =============================================================================
// Sanctions Tables
// =============================================================================

#[tokio::test]
async fn test_preview_does_not_persist() {
    let (app, store) = seeded();
    let response = app
        .oneshot(
            Request::post("/api/sanctions/preview")
                .body(Body::from(SANCTIONS_HTML))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["entries"][0]["dateOfBirth"], "1970-02-01");
    assert_eq!(store.fetch_documents().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_import_then_screen() {
    let (app, store) = seeded();
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/sanctions/import?fileName=list.html")
                .header("x-operator", "ops")
                .body(Body::from(SANCTIONS_HTML))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["count"], 2);
    let doc_id = body["docId"].as_str().unwrap().to_string();
    assert_eq!(store.fetch_documents().await.unwrap().len(), 2);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/check-person",
            json!({ "fullName": "Ali", "idNumber": "0307" }),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["status"], "MATCH_FOUND");
    assert_eq!(body["totalEntriesChecked"], 4);
    assert_eq!(body["matches"][0]["sourceDocId"], doc_id);
}

#[tokio::test]
async fn test_import_without_table() {
    let (app, _) = seeded();
    let response = app
        .oneshot(
            Request::post("/api/sanctions/import")
                .body(Body::from("<p>nothing here</p>"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["text"], "No table found in HTML file");
}
