//! Clearance certificates.
//!
//! A certificate is only ever built for a person whose check came back clear;
//! enforcing that is up to the caller (see `watchlist_policy::Clearance`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;
use watchlist_core::{QueryPerson, NOT_AVAILABLE};

use crate::renderer::CertificateRenderer;
use crate::RenderError;

/// Media type of rendered certificates
pub const CERTIFICATE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Name of the template that renders the full document
pub const CERTIFICATE_TEMPLATE: &str = "certificate";

const SUFFIX_LEN: usize = 9;

/// `CERT-<unix-ms>-<9 upper-case alphanumerics>`
pub fn certificate_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();
    format!("CERT-{}-{}", now.timestamp_millis(), suffix.to_uppercase())
}

/// Person fields as printed, with `N/A` for anything missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSubject {
    pub full_name: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub id_type: String,
    pub id_number: String,
}

impl CertificateSubject {
    pub fn from_person(person: &QueryPerson) -> Self {
        let or_na = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_string();
        Self {
            full_name: or_na(person.name()),
            date_of_birth: or_na(person.birth_date()),
            nationality: or_na(person.nationality()),
            id_type: or_na(person.id_kind()),
            id_number: or_na(person.id()),
        }
    }
}

/// An issued clearance certificate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub number: String,
    pub issued_at: DateTime<Utc>,
    pub subject: CertificateSubject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_entries_checked: Option<usize>,
}

impl Certificate {
    /// Issue a certificate for `person`.
    ///
    /// `timestamp` is the RFC 3339 time of the check; a missing or unparsable
    /// value falls back to now.
    pub fn issue(person: &QueryPerson, timestamp: Option<&str>) -> Result<Self, RenderError> {
        if person.name().is_none() {
            return Err(RenderError::MissingName);
        }

        let now = Utc::now();
        let issued_at = match timestamp.map(DateTime::parse_from_rfc3339) {
            Some(Ok(parsed)) => parsed.with_timezone(&Utc),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "invalid certificate timestamp, using current time");
                now
            }
            None => now,
        };

        Ok(Self {
            number: certificate_number(now),
            issued_at,
            subject: CertificateSubject::from_person(person),
            total_entries_checked: None,
        })
    }

    pub fn with_entries_checked(mut self, total: usize) -> Self {
        self.total_entries_checked = Some(total);
        self
    }

    /// Download name for the rendered document
    pub fn filename(&self) -> String {
        format!("clearance-certificate-{}.html", self.number)
    }

    /// Data handed to the templates
    pub fn template_data(&self) -> Value {
        json!({
            "number": self.number,
            "issuedDate": self.issued_at.format("%B %-d, %Y").to_string(),
            "issuedDateArabic": self.issued_at.format("%d/%m/%Y").to_string(),
            "generatedOn": self.issued_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            "person": self.subject,
            "totalEntriesChecked": self.total_entries_checked,
        })
    }

    /// Render the printable bilingual document
    pub fn render_html(&self, renderer: &CertificateRenderer) -> Result<String, RenderError> {
        renderer.render(CERTIFICATE_TEMPLATE, &self.template_data())
    }
}
