//! Service configuration read from `WATCHLIST_*` environment variables.

use std::path::PathBuf;
use thiserror::Error;
use watchlist_policy::QueryPolicy;
use watchlist_screen::MatchPolicy;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool { name: &'static str, value: String },
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Listen address
    pub addr: String,
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
    /// Certificate templates file; the embedded templates when unset
    pub templates_path: Option<String>,
    pub query_policy: QueryPolicy,
    pub match_policy: MatchPolicy,
    /// Maximum entries returned by the check history
    pub history_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            templates_path: None,
            query_policy: QueryPolicy::default(),
            match_policy: MatchPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset or blank variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let require_full_name = match var("WATCHLIST_REQUIRE_FULL_NAME") {
            Some(value) => parse_bool("WATCHLIST_REQUIRE_FULL_NAME", value)?,
            None => defaults.query_policy.require_full_name,
        };
        let compare_birth_date = match var("WATCHLIST_COMPARE_BIRTH_DATE") {
            Some(value) => parse_bool("WATCHLIST_COMPARE_BIRTH_DATE", value)?,
            None => defaults.match_policy.compare_birth_date,
        };
        let history_limit = match var("WATCHLIST_HISTORY_LIMIT") {
            Some(value) => match value.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "WATCHLIST_HISTORY_LIMIT",
                        value,
                    })
                }
            },
            None => defaults.history_limit,
        };

        Ok(Self {
            addr: var("WATCHLIST_ADDR").unwrap_or(defaults.addr),
            data_dir: var("WATCHLIST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            templates_path: var("WATCHLIST_TEMPLATES"),
            query_policy: QueryPolicy { require_full_name },
            match_policy: MatchPolicy { compare_birth_date },
            history_limit,
        })
    }
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { name, value }),
    }
}
