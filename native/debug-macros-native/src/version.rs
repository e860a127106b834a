//! Version Ranges
//!
//! npm-style range satisfaction on top of `semver`. Supports `||` unions,
//! hyphen ranges (`1.0.0 - 2.0.0`) and whitespace separated comparator sets
//! (`>=1.0.0 <2.0.0`), which `semver::VersionReq` spells with commas.

use semver::{Version, VersionReq};

use crate::error::MacroError;

/// Whether `version` satisfies the npm-style `range`.
pub fn satisfies(version: &Version, range: &str) -> Result<bool, MacroError> {
    for alternative in range.split("||") {
        let req = parse_comparator_set(alternative.trim()).ok_or_else(|| {
            MacroError::InvalidVersionRange {
                range: range.to_string(),
            }
        })?;
        if req.matches(version) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn parse_comparator_set(set: &str) -> Option<VersionReq> {
    if set.is_empty() || set == "*" || set == "x" {
        return Some(VersionReq::STAR);
    }

    if let Some((low, high)) = set.split_once(" - ") {
        return VersionReq::parse(&format!(
            ">={}, <={}",
            strip_v(low.trim()),
            strip_v(high.trim())
        ))
        .ok();
    }

    // Join operators separated from their version (">= 1.0.0") before
    // splitting on whitespace.
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op: Option<String> = None;
    for token in set.split_whitespace() {
        let token = strip_v(token);
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            pending_op = Some(token);
            continue;
        }
        match pending_op.take() {
            Some(op) => comparators.push(format!("{}{}", op, token)),
            // A bare npm version is an exact match, not semver's caret default.
            None if token.starts_with(|c: char| c.is_ascii_digit())
                && !token.contains(['x', 'X', '*']) =>
            {
                comparators.push(format!("={}", token))
            }
            None => comparators.push(token),
        }
    }
    if pending_op.is_some() {
        return None;
    }

    VersionReq::parse(&comparators.join(", ")).ok()
}

/// Drops the `v` npm tolerates in front of a version (`>=v1.2.0`).
fn strip_v(token: &str) -> String {
    let op_len = token
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '~' | '^'))
        .unwrap_or(token.len());
    let (op, rest) = token.split_at(op_len);
    match rest.strip_prefix(['v', 'V']) {
        Some(version) if version.starts_with(|c: char| c.is_ascii_digit()) => {
            format!("{}{}", op, version)
        }
        _ => token.to_string(),
    }
}
