//! Data Model: WatchlistEntry, QueryPerson, MatchResult
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for an optional field known to be absent
pub const NOT_AVAILABLE: &str = "N/A";

/// True when a field holds meaningful text (neither blank nor the sentinel)
pub fn has_value(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != NOT_AVAILABLE
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// One flagged individual or entity in canonical form.
///
/// `name` is never empty. Optional text fields hold either meaningful text,
/// the `N/A` sentinel, or (for hand-pasted rows) the empty string; use
/// [`has_value`] rather than comparing against either form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: String,
    pub name: String,
    #[serde(default = "not_available")]
    pub nationality: String,
    #[serde(default = "not_available")]
    pub date_of_birth: String,
    #[serde(default = "not_available")]
    pub id_type: String,
    #[serde(default = "not_available")]
    pub id_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Persisted document this entry was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_doc_id: Option<String>,
    /// Position inside the source document's `entries` array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
}

impl WatchlistEntry {
    /// Create an entry with every optional field set to the sentinel
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nationality: not_available(),
            date_of_birth: not_available(),
            id_type: not_available(),
            id_number: not_available(),
            notes: None,
            source_doc_id: None,
            entry_index: None,
        }
    }

    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = nationality.into();
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = date_of_birth.into();
        self
    }

    pub fn with_id_type(mut self, id_type: impl Into<String>) -> Self {
        self.id_type = id_type.into();
        self
    }

    pub fn with_id_number(mut self, id_number: impl Into<String>) -> Self {
        self.id_number = id_number.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach provenance. `entry_index` is `None` for legacy single-entry documents.
    pub fn with_provenance(mut self, doc_id: impl Into<String>, entry_index: Option<usize>) -> Self {
        self.source_doc_id = Some(doc_id.into());
        self.entry_index = entry_index;
        self
    }

    /// Drop provenance before the entry is persisted again
    pub fn without_provenance(mut self) -> Self {
        self.source_doc_id = None;
        self.entry_index = None;
        self
    }
}

/// A persisted document as returned by the store, before normalization.
///
/// `body` is either a batch (`{"entries": [...]}`) or a single legacy entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub body: serde_json::Value,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}

/// The subject of a single check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPerson {
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
}

impl QueryPerson {
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            ..Self::default()
        }
    }

    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = Some(nationality.into());
        self
    }

    pub fn with_id_number(mut self, id_number: impl Into<String>) -> Self {
        self.id_number = Some(id_number.into());
        self
    }

    pub fn with_id_type(mut self, id_type: impl Into<String>) -> Self {
        self.id_type = Some(id_type.into());
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = Some(date_of_birth.into());
        self
    }

    /// Trimmed full name, `None` when absent or blank
    pub fn name(&self) -> Option<&str> {
        supplied(&self.full_name)
    }

    pub fn id(&self) -> Option<&str> {
        supplied(&self.id_number)
    }

    pub fn nationality(&self) -> Option<&str> {
        supplied(&self.nationality)
    }

    pub fn birth_date(&self) -> Option<&str> {
        supplied(&self.date_of_birth)
    }

    pub fn id_kind(&self) -> Option<&str> {
        supplied(&self.id_type)
    }

    /// True when none of the matchable fields carries text
    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.id().is_none() && self.nationality().is_none()
    }
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Classification of a check outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    NoMatch,
    MatchFound,
    Error,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchStatus::NoMatch => write!(f, "NO_MATCH"),
            MatchStatus::MatchFound => write!(f, "MATCH_FOUND"),
            MatchStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Outcome of one watchlist check, created fresh per query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchResult {
    /// No entry satisfied every active predicate
    NoMatch {
        #[serde(rename = "totalEntriesChecked")]
        total_entries_checked: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        person: Option<QueryPerson>,
    },

    /// At least one entry matched
    MatchFound {
        matches: Vec<WatchlistEntry>,
        #[serde(rename = "totalEntriesChecked")]
        total_entries_checked: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        person: Option<QueryPerson>,
    },

    /// The check could not be carried out
    Error {
        error: String,
    },
}

impl MatchResult {
    /// Build the result from the matched subset of a scan
    pub fn from_matches(matches: Vec<WatchlistEntry>, total_entries_checked: usize) -> Self {
        if matches.is_empty() {
            MatchResult::NoMatch {
                total_entries_checked,
                person: None,
            }
        } else {
            MatchResult::MatchFound {
                matches,
                total_entries_checked,
                person: None,
            }
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        MatchResult::Error {
            error: message.into(),
        }
    }

    /// Echo the submitted person back to the caller
    pub fn with_person(mut self, query: QueryPerson) -> Self {
        match &mut self {
            MatchResult::NoMatch { person, .. } | MatchResult::MatchFound { person, .. } => {
                *person = Some(query);
            }
            MatchResult::Error { .. } => {}
        }
        self
    }

    pub fn status(&self) -> MatchStatus {
        match self {
            MatchResult::NoMatch { .. } => MatchStatus::NoMatch,
            MatchResult::MatchFound { .. } => MatchStatus::MatchFound,
            MatchResult::Error { .. } => MatchStatus::Error,
        }
    }

    pub fn matches(&self) -> &[WatchlistEntry] {
        match self {
            MatchResult::MatchFound { matches, .. } => matches,
            _ => &[],
        }
    }

    pub fn match_count(&self) -> usize {
        self.matches().len()
    }

    pub fn total_entries_checked(&self) -> usize {
        match self {
            MatchResult::NoMatch {
                total_entries_checked,
                ..
            }
            | MatchResult::MatchFound {
                total_entries_checked,
                ..
            } => *total_entries_checked,
            MatchResult::Error { .. } => 0,
        }
    }

    /// True only for a completed scan with no matches
    pub fn is_clear(&self) -> bool {
        matches!(self, MatchResult::NoMatch { .. })
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchResult::NoMatch {
                total_entries_checked,
                ..
            } => write!(f, "NO_MATCH ({} entries checked)", total_entries_checked),
            MatchResult::MatchFound {
                matches,
                total_entries_checked,
                ..
            } => write!(
                f,
                "MATCH_FOUND: {} of {} entries",
                matches.len(),
                total_entries_checked
            ),
            MatchResult::Error { error } => write!(f, "ERROR: {}", error),
        }
    }
}
