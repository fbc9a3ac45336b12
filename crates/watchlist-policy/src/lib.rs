//! Watchlist Policy: what happens around a check
//!
//! - [`validation`]: refuse queries that cannot be screened
//! - [`verdict`]: turn a match result into a clearance decision
//! - [`audit`]: record every check and search the history
//!
//! # Example
//!
//! ```
//! use watchlist_core::{MatchResult, QueryPerson};
//! use watchlist_policy::{CheckLog, Clearance, QueryPolicy};
//!
//! let person = QueryPerson::named("Jane Doe");
//! QueryPolicy::default().validate(&person).unwrap();
//!
//! let result = MatchResult::from_matches(vec![], 2).with_person(person.clone());
//! assert!(Clearance::from_result(&result).is_granted());
//!
//! let mut log = CheckLog::new();
//! log.log_result(&person, &result);
//! assert_eq!(log.search(Some("jane")).len(), 1);
//! ```

pub mod audit;
pub mod validation;
pub mod verdict;

pub use audit::{AuditEntry, CheckLog, CheckStats};
pub use validation::{QueryError, QueryPolicy};
pub use verdict::{Clearance, Hit};
