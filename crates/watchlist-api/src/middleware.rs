//! Request middleware: CORS and per-request check context.
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::{body::Body, response::Response};
use tower_http::cors::CorsLayer;
use watchlist_core::CheckContext;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const OPERATOR_HEADER: &str = "x-operator";

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Attach a [`CheckContext`] to the request and echo its trace id
pub async fn check_context(mut req: Request<Body>, next: Next) -> Response {
    let mut context = CheckContext::new();
    if let Some(operator) = req
        .headers()
        .get(OPERATOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        context = context.with_operator(operator);
    }

    let trace_id = context.trace_id.clone();
    tracing::debug!(
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
        "request received"
    );
    req.extensions_mut().insert(context);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    }
    response
}
