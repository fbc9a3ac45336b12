//! Watchlist API: REST endpoints for checks, imports and certificates
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use state::{AppState, StartupError};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use watchlist_out::CertificateRenderer;
use watchlist_store::JsonFileStore;

/// Uploaded sanctions exports can be several megabytes
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/check-person", post(handlers::check_person))
        .route("/api/generate-certificate", post(handlers::generate_certificate))
        .route("/api/check-history", get(handlers::check_history))
        .route(
            "/api/watchlist",
            get(handlers::get_watchlist).put(handlers::put_watchlist),
        )
        .route("/api/watchlist/convert", post(handlers::convert_watchlist))
        .route("/api/sanctions/preview", post(handlers::preview_sanctions))
        .route("/api/sanctions/import", post(handlers::import_sanctions))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::check_context))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the file store and templates named by the configuration
pub async fn build_state(config: ServiceConfig) -> Result<AppState, StartupError> {
    let store = JsonFileStore::open(config.data_dir.clone()).await?;
    let renderer = match &config.templates_path {
        Some(path) => CertificateRenderer::load(path)?,
        None => CertificateRenderer::embedded()?,
    };
    tracing::info!(data_dir = %config.data_dir.display(), "watchlist store ready");
    AppState::new(Arc::new(store), renderer, config)
}

pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let addr = config.addr.clone();
    let app = create_app(build_state(config).await?);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Watchlist API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
