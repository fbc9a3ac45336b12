//! Watchlist Out: clearance certificate rendering
//!
//! Certificates are printable bilingual HTML documents rendered with
//! Handlebars from a YAML templates file.
//!
//! # Example
//!
//! ```
//! use watchlist_core::QueryPerson;
//! use watchlist_out::{Certificate, CertificateRenderer};
//!
//! let renderer = CertificateRenderer::embedded().unwrap();
//! let certificate = Certificate::issue(&QueryPerson::named("Jane Doe"), None).unwrap();
//! let html = certificate.render_html(&renderer).unwrap();
//! assert!(html.contains(&certificate.number));
//! ```

pub mod certificate;
pub mod renderer;
pub mod templates;

pub use certificate::{
    certificate_number, Certificate, CertificateSubject, CERTIFICATE_CONTENT_TYPE,
    CERTIFICATE_TEMPLATE,
};
pub use renderer::CertificateRenderer;
pub use templates::TemplatesFile;

use thiserror::Error;
use watchlist_core::{QueryPerson, WatchlistError};

/// Errors that can occur while issuing or rendering a certificate
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Person full name is required")]
    MissingName,
}

impl From<RenderError> for WatchlistError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::MissingName => WatchlistError::InvalidQuery(err.to_string()),
            other => WatchlistError::Render(other.to_string()),
        }
    }
}

/// Issue and render in one step, returning the certificate with its HTML
pub fn render_certificate(
    renderer: &CertificateRenderer,
    person: &QueryPerson,
    timestamp: Option<&str>,
) -> Result<(Certificate, String), RenderError> {
    let certificate = Certificate::issue(person, timestamp)?;
    let html = certificate.render_html(renderer)?;
    tracing::info!(number = %certificate.number, "clearance certificate rendered");
    Ok((certificate, html))
}

/// One-line plain-text notice for an issued certificate
pub fn render_notice(
    renderer: &CertificateRenderer,
    certificate: &Certificate,
) -> Result<String, RenderError> {
    renderer.render("notice", &certificate.template_data())
}
