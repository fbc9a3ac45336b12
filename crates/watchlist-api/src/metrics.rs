//! Prometheus counters for checks, certificates and imports.
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use watchlist_core::MatchStatus;

pub struct ApiMetrics {
    registry: Registry,
    checks_total: IntCounterVec,
    certificates_total: IntCounterVec,
    imports_total: IntCounterVec,
    audit_failures_total: IntCounter,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let checks_total = IntCounterVec::new(
            Opts::new("watchlist_checks_total", "Watchlist checks by outcome"),
            &["status"],
        )?;
        let certificates_total = IntCounterVec::new(
            Opts::new("watchlist_certificates_total", "Certificate requests by outcome"),
            &["outcome"],
        )?;
        let imports_total = IntCounterVec::new(
            Opts::new("watchlist_imports_total", "Imported entries by source"),
            &["source"],
        )?;
        let audit_failures_total = IntCounter::new(
            "watchlist_audit_failures_total",
            "Check log appends that failed",
        )?;

        registry.register(Box::new(checks_total.clone()))?;
        registry.register(Box::new(certificates_total.clone()))?;
        registry.register(Box::new(imports_total.clone()))?;
        registry.register(Box::new(audit_failures_total.clone()))?;

        Ok(Self {
            registry,
            checks_total,
            certificates_total,
            imports_total,
            audit_failures_total,
        })
    }

    pub fn record_check(&self, status: MatchStatus) {
        let label = status.to_string();
        self.checks_total.with_label_values(&[label.as_str()]).inc();
    }

    pub fn record_certificate(&self, outcome: &str) {
        self.certificates_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_import(&self, source: &str, entries: usize) {
        self.imports_total
            .with_label_values(&[source])
            .inc_by(entries as u64);
    }

    pub fn record_audit_failure(&self) {
        self.audit_failures_total.inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
