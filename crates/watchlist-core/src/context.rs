//! Check Context: per-request metadata carried through a check
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct CheckContext {
    pub trace_id: String,
    pub operator: Option<String>,
    pub requested_at: DateTime<Utc>,
}

impl CheckContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            operator: None,
            requested_at: Utc::now(),
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Milliseconds since the epoch at request time, used in generated ids
    pub fn timestamp_millis(&self) -> i64 {
        self.requested_at.timestamp_millis()
    }
}

impl Default for CheckContext {
    fn default() -> Self {
        Self::new()
    }
}
