//! Wire Codec for the Graph Store's Response Grammar
//!
//! The graph store answers queries with a line-oriented triple grammar:
//!
//! ```text
//! <subjectRef> <predicate> <value-or-ref> .
//! ```
//!
//! one statement per line, terminated by a blank line. This module parses
//! that grammar (identifiers, counts, count maps, predicate maps) and
//! encodes the triple literals used by mutations.
//!
//! All tokenizing delimits on the surrounding quote/paren characters.
//! Identifier refs are opaque and variable-width; a fixed-width byte-offset
//! scheme breaks silently the moment the store changes its ref encoding.

use crate::graph::error::GraphError;
use std::collections::HashMap;

/// Extract the substring between the first pair of double quotes
fn quoted(line: &str) -> Option<&str> {
    let start = line.find('"')?;
    let rest = &line[start + 1..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Extract the substring between the last pair of double quotes
fn last_quoted(line: &str) -> Option<&str> {
    let end = line.rfind('"')?;
    let start = line[..end].rfind('"')?;
    Some(&line[start + 1..end])
}

/// Extract the substring between the first `(` and its closing `)`
fn parenthesized(line: &str) -> Option<&str> {
    let open = line.find('(')?;
    let rest = &line[open + 1..];
    let close = rest.find(')')?;
    Some(&rest[..close])
}

/// Statement lines of a raw response (blank terminator stripped)
fn statement_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Parse identifiers from a list-style response, in response order
///
/// The first statement line is the querying subject's own declaration and
/// is skipped, as is the trailing blank line. Empty input yields an empty
/// vec, never an error - list queries legitimately have zero matches.
pub fn parse_ids(raw: &[u8]) -> Vec<String> {
    statement_lines(raw)
        .iter()
        .skip(1)
        .filter_map(|line| quoted(line))
        .map(|id| id.to_string())
        .collect()
}

/// Parse a count response: exactly one statement line
///
/// The value is the substring between the last pair of double quotes,
/// parsed as an unsigned integer.
///
/// # Errors
///
/// Returns `GraphError::Format` if the response is not exactly one
/// statement, quotes are absent, or the quoted content is non-numeric.
pub fn parse_count(raw: &[u8]) -> Result<u64, GraphError> {
    let lines = statement_lines(raw);
    if lines.len() != 1 {
        return Err(GraphError::format(format!(
            "count response must be exactly one statement, got {}",
            lines.len()
        )));
    }

    let value = last_quoted(&lines[0])
        .ok_or_else(|| GraphError::format(format!("count statement has no quoted value: {}", lines[0])))?;

    value
        .parse::<u64>()
        .map_err(|_| GraphError::format(format!("count value is not numeric: {:?}", value)))
}

/// Parse a count-map response: one `<ref> <count(predicate)> "n" .` per line
///
/// The map key is the substring between `(` and `)`, the value the quoted
/// numeral.
///
/// # Errors
///
/// Returns `GraphError::Format` on any malformed line.
pub fn parse_count_map(raw: &[u8]) -> Result<HashMap<String, u64>, GraphError> {
    let mut counts = HashMap::new();

    for line in statement_lines(raw) {
        let predicate = parenthesized(&line).ok_or_else(|| {
            GraphError::format(format!("count-map line has no parenthesized predicate: {}", line))
        })?;
        let value = last_quoted(&line).ok_or_else(|| {
            GraphError::format(format!("count-map line has no quoted value: {}", line))
        })?;
        let count = value
            .parse::<u64>()
            .map_err(|_| GraphError::format(format!("count value is not numeric: {:?}", value)))?;

        counts.insert(predicate.to_string(), count);
    }

    Ok(counts)
}

/// Parse a predicate-map response (multi-edge statistics summary)
///
/// Scans lines tracking a "current predicate" cursor: a parenthesized
/// predicate-declaration line switches context, a quoted identifier line
/// appends to the active predicate's list.
///
/// # Errors
///
/// Returns `GraphError::Format` for an identifier line before any
/// declaration, or a line carrying neither form.
pub fn parse_predicate_map(raw: &[u8]) -> Result<HashMap<String, Vec<String>>, GraphError> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in statement_lines(raw) {
        if let Some(predicate) = parenthesized(&line) {
            map.entry(predicate.to_string()).or_default();
            current = Some(predicate.to_string());
        } else if let Some(id) = quoted(&line) {
            let predicate = current.as_ref().ok_or_else(|| {
                GraphError::format(format!("identifier before any predicate declaration: {}", line))
            })?;
            map.get_mut(predicate)
                .expect("current predicate always has a map entry")
                .push(id.to_string());
        } else {
            return Err(GraphError::format(format!(
                "predicate-map line is neither declaration nor identifier: {}",
                line
            )));
        }
    }

    Ok(map)
}

/// Encode one statement with a quoted scalar/identifier value
pub fn triple(subject_ref: &str, predicate: &str, value: &str) -> Vec<u8> {
    format!("{} <{}> \"{}\" .\n", subject_ref, predicate, value).into_bytes()
}

/// Encode one node-to-node statement with an unquoted object reference
pub fn triple_uid(subject_ref: &str, predicate: &str, object_ref: &str) -> Vec<u8> {
    format!("{} <{}> {} .\n", subject_ref, predicate, object_ref).into_bytes()
}
