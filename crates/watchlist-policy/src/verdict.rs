//! Clearance decisions derived from a match result
//!
//! A certificate may only be issued under [`Clearance::Granted`].

use serde::{Deserialize, Serialize};
use std::fmt;
use watchlist_core::{MatchResult, WatchlistEntry};

/// Whether a screened person may be cleared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Clearance {
    /// No watchlist entry matched
    Granted {
        #[serde(rename = "totalEntriesChecked")]
        total_entries_checked: usize,
    },

    /// Clearance cannot be issued
    Withheld {
        reason: String,
        hits: Vec<Hit>,
        #[serde(skip_serializing_if = "Option::is_none")]
        remediation: Option<Vec<String>>,
    },
}

impl Clearance {
    pub fn granted(total_entries_checked: usize) -> Self {
        Clearance::Granted {
            total_entries_checked,
        }
    }

    pub fn withheld(reason: impl Into<String>, hits: Vec<Hit>) -> Self {
        Clearance::Withheld {
            reason: reason.into(),
            hits,
            remediation: None,
        }
    }

    pub fn withheld_with_remediation(
        reason: impl Into<String>,
        hits: Vec<Hit>,
        remediation: Vec<String>,
    ) -> Self {
        Clearance::Withheld {
            reason: reason.into(),
            hits,
            remediation: Some(remediation),
        }
    }

    /// Derive the decision for a finished check
    pub fn from_result(result: &MatchResult) -> Self {
        match result {
            MatchResult::NoMatch {
                total_entries_checked,
                ..
            } => Clearance::granted(*total_entries_checked),
            MatchResult::MatchFound { matches, .. } => Clearance::withheld_with_remediation(
                format!("Person matches {} watchlist entr{}", matches.len(), plural(matches.len())),
                matches.iter().map(Hit::from_entry).collect(),
                vec!["Review the matched entries before onboarding".to_string()],
            ),
            MatchResult::Error { error } => Clearance::withheld_with_remediation(
                format!("Check could not be completed: {}", error),
                Vec::new(),
                vec!["Retry the check".to_string()],
            ),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Clearance::Granted { .. })
    }

    pub fn hits(&self) -> &[Hit] {
        match self {
            Clearance::Withheld { hits, .. } => hits,
            Clearance::Granted { .. } => &[],
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Clearance::Withheld { reason, .. } => Some(reason),
            Clearance::Granted { .. } => None,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

/// One matched entry behind a withheld clearance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    pub entry_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
}

impl Hit {
    pub fn from_entry(entry: &WatchlistEntry) -> Self {
        Self {
            entry_id: entry.id.clone(),
            name: entry.name.clone(),
            source_doc_id: entry.source_doc_id.clone(),
            entry_index: entry.entry_index,
        }
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Clearance::Granted {
                total_entries_checked,
            } => write!(f, "GRANTED ({} entries checked)", total_entries_checked),
            Clearance::Withheld { reason, hits, .. } => {
                write!(f, "WITHHELD: {}", reason)?;
                if !hits.is_empty() {
                    write!(f, " ({} hits)", hits.len())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_result_is_granted() {
        let clearance = Clearance::from_result(&MatchResult::from_matches(vec![], 12));
        assert!(clearance.is_granted());
        assert!(clearance.hits().is_empty());
        assert_eq!(format!("{}", clearance), "GRANTED (12 entries checked)");
    }

    #[test]
    fn test_match_is_withheld_with_hits() {
        let entry = WatchlistEntry::new("DEMO-001", "John Demo").with_provenance("watchlist", Some(0));
        let clearance = Clearance::from_result(&MatchResult::from_matches(vec![entry], 2));

        assert!(!clearance.is_granted());
        assert_eq!(clearance.reason(), Some("Person matches 1 watchlist entry"));
        assert_eq!(clearance.hits()[0].entry_id, "DEMO-001");
        assert_eq!(clearance.hits()[0].source_doc_id.as_deref(), Some("watchlist"));
    }

    #[test]
    fn test_error_is_withheld() {
        let clearance = Clearance::from_result(&MatchResult::error("store unavailable"));
        assert!(!clearance.is_granted());
        assert!(clearance.reason().unwrap().contains("store unavailable"));
    }

    #[test]
    fn test_clearance_serialization() {
        let clearance = Clearance::withheld("Matched", vec![]);
        let json = serde_json::to_string(&clearance).unwrap();
        assert!(json.contains("WITHHELD"));
        assert!(!json.contains("remediation"));

        let parsed: Clearance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, clearance);
    }
}
