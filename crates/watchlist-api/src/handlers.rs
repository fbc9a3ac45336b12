//! API Handlers
use axum::{
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use watchlist_core::{CheckContext, MatchResult, QueryPerson, WatchlistEntry, WATCHLIST_VERSION};
use watchlist_out::{Certificate, RenderError, CERTIFICATE_CONTENT_TYPE};
use watchlist_policy::{AuditEntry, CheckLog, Clearance};
use watchlist_screen::{
    assemble_working_set, convert_json_entries, convert_tab_rows, import_sanctions_table,
    match_entries,
};
use watchlist_store::{ImportBatch, StoreError};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

const DEFAULT_UPLOAD_NAME: &str = "sanctions.html";

/// Screen a person against every persisted document
async fn screen(state: &AppState, person: &QueryPerson) -> Result<MatchResult, StoreError> {
    let documents = state.store.fetch_documents().await?;
    let working_set = assemble_working_set(&documents);
    Ok(match_entries(person, &working_set, &state.config.match_policy))
}

/// Append to the check log without failing the check
async fn record_check(state: &AppState, ctx: &CheckContext, person: &QueryPerson, result: &MatchResult) {
    let mut entry = AuditEntry::from_result(person, result);
    if let Some(operator) = &ctx.operator {
        entry = entry.with_operator(operator.clone());
    }
    if let Err(e) = state.store.append_check(&entry).await {
        state.metrics.record_audit_failure();
        tracing::warn!(trace_id = %ctx.trace_id, error = %e, "failed to record check");
    }
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": WATCHLIST_VERSION })),
    )
}

pub async fn check_person(
    State(state): State<AppState>,
    Extension(ctx): Extension<CheckContext>,
    ApiJson(person): ApiJson<QueryPerson>,
) -> (StatusCode, Json<MatchResult>) {
    if let Err(e) = state.config.query_policy.validate(&person) {
        let result = MatchResult::error(e.to_string());
        state.metrics.record_check(result.status());
        return (StatusCode::BAD_REQUEST, Json(result));
    }

    let result = match screen(&state, &person).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(trace_id = %ctx.trace_id, error = %e, "watchlist unavailable");
            let result = MatchResult::error(e.to_string());
            state.metrics.record_check(result.status());
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(result));
        }
    };

    tracing::info!(
        trace_id = %ctx.trace_id,
        status = %result.status(),
        matches = result.match_count(),
        "check complete"
    );
    state.metrics.record_check(result.status());
    record_check(&state, &ctx, &person, &result).await;

    (StatusCode::OK, Json(result))
}

#[derive(Debug, Deserialize)]
pub struct CertificateRequest {
    #[serde(default)]
    pub person: Option<QueryPerson>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

pub async fn generate_certificate(
    State(state): State<AppState>,
    Extension(ctx): Extension<CheckContext>,
    ApiJson(request): ApiJson<CertificateRequest>,
) -> Result<Response, ApiError> {
    let person = request
        .person
        .ok_or_else(|| ApiError::BadRequest("Person data is required".to_string()))?;
    if person.name().is_none() {
        return Err(RenderError::MissingName.into());
    }

    // The person is screened again so a stale client result cannot yield a certificate.
    let result = screen(&state, &person).await?;
    let clearance = Clearance::from_result(&result);
    if !clearance.is_granted() {
        state.metrics.record_certificate("withheld");
        tracing::warn!(trace_id = %ctx.trace_id, %clearance, "certificate withheld");
        return Err(ApiError::Conflict(format!(
            "Certificate withheld: {}",
            clearance.reason().unwrap_or("check did not clear")
        )));
    }

    let certificate = Certificate::issue(&person, request.timestamp.as_deref())?
        .with_entries_checked(result.total_entries_checked());
    let html = certificate.render_html(&state.renderer)?;
    state.metrics.record_certificate("issued");
    tracing::info!(trace_id = %ctx.trace_id, number = %certificate.number, "certificate issued");

    Ok((
        [
            (header::CONTENT_TYPE, CERTIFICATE_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", certificate.filename()),
            ),
            (
                HeaderName::from_static("x-certificate-number"),
                certificate.number.clone(),
            ),
        ],
        html,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub query: Option<String>,
}

pub async fn check_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let log = CheckLog::from_entries(state.store.check_history().await?);
    let history: Vec<&AuditEntry> = log
        .search(params.query.as_deref())
        .into_iter()
        .take(state.config.history_limit)
        .collect();
    Ok(Json(json!({ "history": history, "stats": log.stats() })))
}

pub async fn get_watchlist(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let watchlist = state.store.load_watchlist().await?;
    Ok(Json(json!({ "watchlist": watchlist })))
}

pub async fn put_watchlist(
    State(state): State<AppState>,
    Extension(ctx): Extension<CheckContext>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, ApiError> {
    let records = body
        .get("watchlist")
        .filter(|value| value.is_array())
        .ok_or_else(|| ApiError::BadRequest("Watchlist must be an array of entries".to_string()))?;

    let entries = convert_json_entries(records, ctx.timestamp_millis())?;
    let count = state.store.replace_watchlist(&entries).await?;
    state.metrics.record_import("json", count);

    Ok(Json(json!({
        "success": true,
        "count": count,
        "type": "success",
        "text": format!("Watchlist updated with {} entries", count),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub base: Vec<WatchlistEntry>,
}

pub async fn convert_watchlist(
    Extension(ctx): Extension<CheckContext>,
    ApiJson(request): ApiJson<ConvertRequest>,
) -> Result<Json<Value>, ApiError> {
    let converted = convert_tab_rows(&request.text, ctx.timestamp_millis())?;
    let count = converted.len();

    let mut watchlist = request.base;
    watchlist.extend(converted);

    Ok(Json(json!({
        "type": "success",
        "text": format!(
            "Converted {} row{}. Review the JSON and save the watchlist to persist the changes.",
            count,
            if count == 1 { "" } else { "s" }
        ),
        "watchlist": watchlist,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
}

pub async fn preview_sanctions(
    Extension(ctx): Extension<CheckContext>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let entries = import_sanctions_table(&body, ctx.timestamp_millis())?;
    Ok(Json(json!({
        "type": "success",
        "text": format!(
            "HTML processed successfully! Extracted {} entries from the table.",
            entries.len()
        ),
        "count": entries.len(),
        "entries": entries,
    })))
}

pub async fn import_sanctions(
    State(state): State<AppState>,
    Extension(ctx): Extension<CheckContext>,
    Query(upload): Query<UploadQuery>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let entries = import_sanctions_table(&body, ctx.timestamp_millis())?;
    let count = entries.len();

    let file_name = upload
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());
    let mut batch = ImportBatch::new(file_name, entries)
        .with_uploaded_at(ctx.requested_at)
        .with_source_html(body);
    if let Some(operator) = &ctx.operator {
        batch = batch.with_uploader(operator.clone());
    }

    let doc_id = state.store.append_batch(&batch).await?;
    state.metrics.record_import("table", count);
    tracing::info!(trace_id = %ctx.trace_id, doc_id = %doc_id, count, "sanctions table imported");

    Ok(Json(json!({
        "type": "success",
        "text": format!("Successfully saved {} entries. Document ID: {}", count, doc_id),
        "docId": doc_id,
        "count": count,
    })))
}

pub async fn metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .encode()
        .map_err(|e| ApiError::Internal(format!("metrics encoding failed: {}", e)))
}
