//! Check audit trail
//!
//! Every completed check is recorded with its input and outcome so it can be
//! searched later from the check history.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use watchlist_core::{MatchResult, MatchStatus, QueryPerson};

/// One recorded check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique entry ID; older logs may lack one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// RFC 3339 timestamp of the check
    pub timestamp: String,

    /// The query as submitted
    #[serde(default)]
    pub input: QueryPerson,

    /// Outcome status
    pub result: MatchStatus,

    /// Number of matched entries
    #[serde(default)]
    pub matches: usize,

    /// Failure message for `ERROR` outcomes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Who ran the check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl AuditEntry {
    /// Record the outcome of a check
    pub fn from_result(input: &QueryPerson, result: &MatchResult) -> Self {
        let error = match result {
            MatchResult::Error { error } => Some(error.clone()),
            _ => None,
        };

        Self {
            id: generate_audit_id(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            input: input.clone(),
            result: result.status(),
            matches: result.match_count(),
            error,
            operator: None,
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Case-insensitive substring match on the input name or id number
    pub fn mentions(&self, needle_lower: &str) -> bool {
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .map(|value| value.to_lowercase().contains(needle_lower))
                .unwrap_or(false)
        };
        contains(&self.input.full_name) || contains(&self.input.id_number)
    }
}

/// In-memory collector for check entries, oldest first
#[derive(Debug, Clone)]
pub struct CheckLog {
    entries: Vec<AuditEntry>,
    max_entries: usize,
}

impl CheckLog {
    pub fn new() -> Self {
        Self::with_max_entries(10000)
    }

    pub fn with_max_entries(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max,
        }
    }

    /// Rebuild a log from persisted entries
    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        let mut log = Self::new();
        log.entries = entries;
        log.trim();
        log
    }

    pub fn log(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
        self.trim();
    }

    /// Record a check and return the entry ID
    pub fn log_result(&mut self, input: &QueryPerson, result: &MatchResult) -> String {
        let entry = AuditEntry::from_result(input, result);
        let id = entry.id.clone();
        self.log(entry);
        id
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_entries {
            let drain_count = self.entries.len() - self.max_entries;
            self.entries.drain(0..drain_count);
            tracing::debug!(dropped = drain_count, kept = self.max_entries, "check log trimmed");
        }
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose input name or id number contains `query`, newest first.
    ///
    /// A missing or blank query returns the whole history.
    pub fn search(&self, query: Option<&str>) -> Vec<&AuditEntry> {
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        self.entries
            .iter()
            .rev()
            .filter(|entry| match &needle {
                Some(needle) => entry.mentions(needle),
                None => true,
            })
            .collect()
    }

    pub fn stats(&self) -> CheckStats {
        let count = |status: MatchStatus| self.entries.iter().filter(|e| e.result == status).count();

        let total = self.entries.len();
        let matched = count(MatchStatus::MatchFound);
        CheckStats {
            total,
            matched,
            clear: count(MatchStatus::NoMatch),
            errors: count(MatchStatus::Error),
            match_rate: if total > 0 {
                matched as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for CheckLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about recorded checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStats {
    pub total: usize,
    pub matched: usize,
    pub clear: usize,
    pub errors: usize,
    pub match_rate: f64,
}

fn generate_audit_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("chk_{:x}_{:04x}", millis, counter % 0xFFFF)
}
