//! Watchlist matching.
//!
//! Each entry is tested with independent per-field predicates. A predicate
//! is active only when the query supplies that field, and an entry matches
//! when every active predicate holds.

use crate::normalizer::{extract_id_number, fold, normalize_date};
use serde::{Deserialize, Serialize};
use watchlist_core::{has_value, MatchResult, QueryPerson, WatchlistEntry};

/// Tunables for the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Also require the birth date to match when the query supplies one
    #[serde(default)]
    pub compare_birth_date: bool,
}

impl MatchPolicy {
    pub fn with_birth_date(mut self, enabled: bool) -> Self {
        self.compare_birth_date = enabled;
        self
    }
}

/// Query fields folded once, before the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    name: Option<String>,
    id_number: Option<String>,
    nationality: Option<String>,
    date_of_birth: Option<String>,
}

impl PreparedQuery {
    pub fn new(person: &QueryPerson) -> Self {
        Self {
            name: person.name().map(fold),
            id_number: person.id().map(|id| fold(&extract_id_number(id))),
            nationality: person.nationality().map(fold),
            date_of_birth: person.birth_date().map(normalize_date),
        }
    }

    /// True when no predicate would be active
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id_number.is_none() && self.nationality.is_none()
    }
}

/// Per-field outcome for one entry; `None` means the predicate was inactive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FieldOutcome {
    pub name: Option<bool>,
    pub id_number: Option<bool>,
    pub nationality: Option<bool>,
    pub date_of_birth: Option<bool>,
}

impl FieldOutcome {
    /// Conjunction over the active predicates
    pub fn is_match(&self) -> bool {
        [self.name, self.id_number, self.nationality, self.date_of_birth]
            .iter()
            .all(|outcome| outcome.unwrap_or(true))
    }
}

/// Evaluate every predicate of `query` against one entry
pub fn evaluate(query: &PreparedQuery, entry: &WatchlistEntry, policy: &MatchPolicy) -> FieldOutcome {
    FieldOutcome {
        name: query
            .name
            .as_deref()
            .map(|name| contains_either(name, &entry.name)),
        id_number: query
            .id_number
            .as_deref()
            .map(|id| id_matches(id, &entry.id_number)),
        nationality: query
            .nationality
            .as_deref()
            .map(|nationality| contains_either(nationality, &entry.nationality)),
        date_of_birth: query
            .date_of_birth
            .as_deref()
            .filter(|_| policy.compare_birth_date)
            .map(|date| date_contains_either(date, &entry.date_of_birth)),
    }
}

/// Symmetric containment after folding; an absent candidate never matches
fn contains_either(query: &str, candidate: &str) -> bool {
    if !has_value(candidate) {
        return false;
    }
    let candidate = fold(candidate);
    candidate.contains(query) || query.contains(candidate.as_str())
}

/// Exact equality of the extracted numbers, not containment
fn id_matches(query: &str, candidate: &str) -> bool {
    has_value(candidate) && fold(&extract_id_number(candidate)) == query
}

/// Dates keep their case and are compared in normalized form
fn date_contains_either(query: &str, candidate: &str) -> bool {
    if !has_value(candidate) {
        return false;
    }
    let candidate = normalize_date(candidate);
    candidate.contains(query) || query.contains(candidate.as_str())
}

/// Scan every entry and collect the matches.
///
/// Entries are returned as given, provenance included. The caller is expected
/// to have validated the query; an empty query matches every entry.
pub fn match_entries(
    person: &QueryPerson,
    entries: &[WatchlistEntry],
    policy: &MatchPolicy,
) -> MatchResult {
    let query = PreparedQuery::new(person);

    let matches: Vec<WatchlistEntry> = entries
        .iter()
        .filter(|entry| evaluate(&query, entry, policy).is_match())
        .cloned()
        .collect();

    tracing::debug!(
        checked = entries.len(),
        matched = matches.len(),
        "watchlist scan complete"
    );

    MatchResult::from_matches(matches, entries.len()).with_person(person.clone())
}
