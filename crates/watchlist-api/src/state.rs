//! Shared application state
use std::sync::Arc;
use thiserror::Error;
use watchlist_out::{CertificateRenderer, RenderError};
use watchlist_store::{StoreError, WatchlistStore};

use crate::config::{ConfigError, ServiceConfig};
use crate::metrics::ApiMetrics;

/// Failures while bringing the service up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("templates: {0}")]
    Templates(#[from] RenderError),
    #[error("metrics: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WatchlistStore>,
    pub renderer: Arc<CertificateRenderer>,
    pub metrics: Arc<ApiMetrics>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn WatchlistStore>,
        renderer: CertificateRenderer,
        config: ServiceConfig,
    ) -> Result<Self, StartupError> {
        Ok(Self {
            store,
            renderer: Arc::new(renderer),
            metrics: Arc::new(ApiMetrics::new()?),
            config: Arc::new(config),
        })
    }
}
