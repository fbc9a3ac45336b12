//! Batch conversion into canonical entries.
//!
//! Hand-pasted tab rows are all-or-nothing: one bad line rejects the batch.
//! Table and JSON batches skip unusable rows and only fail when nothing is left.

use crate::normalizer::{collapse_whitespace, normalize_date};
use crate::records::entry_from_record;
use crate::ImportError;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use watchlist_core::{WatchlistEntry, NOT_AVAILABLE};

lazy_static! {
    /// Field separator for pasted rows
    static ref TABS: Regex = Regex::new(r"\t+").unwrap();

    /// Column label some list exports repeat inside the nationality cell
    static ref NATIONALITY_LABEL: Regex = Regex::new(r"\s*الجنسية\s*").unwrap();
}

/// Minimum columns for pasted rows and table rows
pub const MIN_FIELDS: usize = 5;

/// Placeholder id for an entry that arrived without one
pub fn placeholder_id(timestamp_millis: i64, line_number: usize) -> String {
    format!("ENTRY-{}-{}", timestamp_millis, line_number)
}

/// Convert pasted tab-separated rows.
///
/// Columns: id, name, nationality, date of birth, id number, then optional id
/// type and notes. Line numbers in errors are 1-based over non-empty lines.
pub fn convert_tab_rows(
    text: &str,
    timestamp_millis: i64,
) -> Result<Vec<WatchlistEntry>, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptyInput);
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .iter()
        .enumerate()
        .map(|(index, line)| convert_tab_row(line, index + 1, timestamp_millis))
        .collect()
}

fn convert_tab_row(
    line: &str,
    line_number: usize,
    timestamp_millis: i64,
) -> Result<WatchlistEntry, ImportError> {
    let parts: Vec<&str> = TABS.split(line).map(str::trim).collect();
    if parts.len() < MIN_FIELDS {
        return Err(ImportError::TooFewFields { line: line_number });
    }

    let name = parts[1];
    if name.is_empty() {
        return Err(ImportError::MissingName { line: line_number });
    }

    let id = match parts[0] {
        "" => placeholder_id(timestamp_millis, line_number),
        id => id.to_string(),
    };
    let optional = |index: usize| parts.get(index).copied().unwrap_or("").to_string();

    let mut entry = WatchlistEntry::new(id, name)
        .with_nationality(parts[2])
        .with_date_of_birth(normalize_date(parts[3]))
        .with_id_number(parts[4])
        .with_id_type(optional(5));
    entry.notes = Some(optional(6)).filter(|notes| !notes.is_empty());

    Ok(entry)
}

/// Convert rows extracted from a sanctions table.
///
/// Columns: serial, name, nationality, birth date, id number. Short or nameless
/// rows are skipped with a warning.
pub fn convert_table_rows(
    rows: &[Vec<String>],
    timestamp_millis: i64,
) -> Result<Vec<WatchlistEntry>, ImportError> {
    if rows.is_empty() {
        return Err(ImportError::NoRows);
    }

    let mut entries = Vec::with_capacity(rows.len());
    for (index, cells) in rows.iter().enumerate() {
        let row_number = index + 1;
        if cells.len() < MIN_FIELDS {
            tracing::warn!(row = row_number, columns = cells.len(), "row has insufficient columns");
            continue;
        }

        let name = collapse_whitespace(&cells[1]);
        if name.is_empty() {
            tracing::warn!(row = row_number, "row is missing a name value");
            continue;
        }

        let nationality = NATIONALITY_LABEL.replace_all(&cells[2], "").trim().to_string();
        let birth = cells[3].trim();
        let id_number = cells[4].trim();

        entries.push(
            WatchlistEntry::new(placeholder_id(timestamp_millis, row_number), name)
                .with_nationality(sentinel_if_empty(&nationality))
                .with_date_of_birth(sentinel_if_empty(&normalize_date(birth)))
                .with_id_number(sentinel_if_empty(id_number)),
        );
    }

    if entries.is_empty() {
        return Err(ImportError::NoUsableRows);
    }
    Ok(entries)
}

/// Convert a JSON array of loosely shaped records.
///
/// An empty array is accepted and clears the list; a non-empty array that
/// yields no usable record is rejected.
pub fn convert_json_entries(
    value: &Value,
    timestamp_millis: i64,
) -> Result<Vec<WatchlistEntry>, ImportError> {
    let records = value.as_array().ok_or(ImportError::NotAnArray)?;

    let entries: Vec<WatchlistEntry> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let entry =
                entry_from_record(record, || placeholder_id(timestamp_millis, index + 1));
            if entry.is_none() {
                tracing::warn!(index, "skipping JSON record without a name");
            }
            entry
        })
        .collect();

    if !records.is_empty() && entries.is_empty() {
        return Err(ImportError::NoUsableEntries);
    }
    Ok(entries)
}

fn sentinel_if_empty(value: &str) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}
