//! Field normalization for watchlist entries and queries.
//!
//! - Day/month/year dates to ISO `YYYY-MM-DD`
//! - Identifying numbers stripped of label prefixes
//! - Case folding and whitespace collapsing for comparisons

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Already-normalized ISO date
    static ref ISO_DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();

    /// Run of consecutive ASCII digits
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    /// Multiple whitespace pattern
    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Two-digit years at or above this value belong to the 1900s
const CENTURY_PIVOT: u32 = 50;

/// Normalize a date-like string to `YYYY-MM-DD`.
///
/// Accepts ISO dates unchanged and day/month/year dates separated by `/` or
/// `-`. Anything that cannot be parsed with confidence comes back as the
/// trimmed input, so the result is always safe to store.
pub fn normalize_date(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || ISO_DATE.is_match(trimmed) {
        return trimmed.to_string();
    }

    parse_day_month_year(trimmed).unwrap_or_else(|| trimmed.to_string())
}

fn parse_day_month_year(text: &str) -> Option<String> {
    let unified = text.replace('-', "/");
    let parts: Vec<&str> = unified.split('/').map(str::trim).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    if !is_numeric(day) || !is_numeric(month) || !is_numeric(year) {
        return None;
    }
    if day.len() > 2 || month.len() > 2 {
        return None;
    }

    let year = match year.len() {
        2 => {
            let short: u32 = year.parse().ok()?;
            if short >= CENTURY_PIVOT {
                format!("19{}", year)
            } else {
                format!("20{}", year)
            }
        }
        4 => year.to_string(),
        _ => return None,
    };

    let day_number: u32 = day.parse().ok()?;
    let month_number: u32 = month.parse().ok()?;
    if !(1..=31).contains(&day_number) || !(1..=12).contains(&month_number) {
        return None;
    }

    Some(format!("{}-{:0>2}-{:0>2}", year, month, day))
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())
}

/// Extract the identifying number from descriptive text.
///
/// 1. After the last colon: if that part holds a digit, keep only its digits.
/// 2. Otherwise the longest run of consecutive digits (first one on ties).
/// 3. Otherwise the trimmed text unchanged.
///
/// Numbers stay strings, so leading zeros survive.
pub fn extract_id_number(text: &str) -> String {
    let trimmed = text.trim();

    if let Some((_, labelled)) = trimmed.rsplit_once(':') {
        let labelled = labelled.trim();
        if labelled.chars().any(|c| c.is_ascii_digit()) {
            let digits: String = labelled.chars().filter(char::is_ascii_digit).collect();
            if !digits.is_empty() {
                return digits;
            }
        }
    }

    match longest_digit_run(trimmed) {
        Some(run) => run.to_string(),
        None => trimmed.to_string(),
    }
}

fn longest_digit_run(text: &str) -> Option<&str> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .fold(None, |best: Option<&str>, run| match best {
            Some(current) if current.len() >= run.len() => Some(current),
            _ => Some(run),
        })
}

/// Case-fold and trim for substring comparison
pub fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Collapse internal whitespace runs to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    MULTI_SPACE.replace_all(text.trim(), " ").to_string()
}
