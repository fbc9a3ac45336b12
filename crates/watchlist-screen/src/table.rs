//! Table extraction from uploaded sanctions list exports.
//!
//! Exports are HTML documents holding a single table. Only body rows are
//! read; header and footer sections are dropped. Cell text has tags stripped,
//! entities decoded and whitespace collapsed.

use crate::normalizer::collapse_whitespace;
use crate::ImportError;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref TABLE: Regex = Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").unwrap();

    /// Header and footer sections, which never hold data rows
    static ref HEAD_OR_FOOT: Regex =
        Regex::new(r"(?is)<thead\b[^>]*>.*?</thead\s*>|<tfoot\b[^>]*>.*?</tfoot\s*>").unwrap();

    static ref ROW: Regex = Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap();

    static ref CELL: Regex = Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").unwrap();

    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();

    static ref ENTITY: Regex = Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap();
}

/// Extract the data rows of the first table in an HTML document.
///
/// Each row is the list of its `<td>` cell texts. Rows made only of header
/// cells come back empty and are dropped later by row conversion.
pub fn extract_table_rows(html: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let table = TABLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or(ImportError::NoTable)?;

    let body = HEAD_OR_FOOT.replace_all(table.as_str(), "");
    let rows: Vec<Vec<String>> = ROW
        .captures_iter(&body)
        .map(|row| {
            CELL.captures_iter(&row[1])
                .map(|cell| cell_text(&cell[1]))
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return Err(ImportError::NoRows);
    }

    tracing::debug!(rows = rows.len(), "extracted table rows");
    Ok(rows)
}

fn cell_text(raw: &str) -> String {
    let without_tags = TAG.replace_all(raw, " ");
    collapse_whitespace(&decode_entities(&without_tags))
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}
