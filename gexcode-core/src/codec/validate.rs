//! Round-trip validation between the long and short notations.
//!
//! Two checks, in order:
//! 1. both sides name the same instrument symbols
//! 2. applying the inverse transform to the converted text reproduces the
//!    original, compared by BLAKE3 over whitespace-normalized lines
//!
//! A failure blocks the write unless the caller forces it. A hash mismatch
//! is flagged set-equivalent only when the original parsed without dropping
//! anything and the round trip carries the same `(price, code)` pairs.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use super::line::lines_equivalent;
use super::{parse, transform, Direction};
use crate::domain::Warning;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error(
        "symbol sets differ (only in original: [{}]; only in converted: [{}])",
        only_original.join(", "),
        only_converted.join(", ")
    )]
    SymbolMismatch {
        only_original: Vec<String>,
        only_converted: Vec<String>,
    },

    #[error("round-trip hash {round_trip} does not match original {original}: possible data loss")]
    HashMismatch {
        original: String,
        round_trip: String,
        /// Whether nothing was dropped and both sides carry the same levels
        /// as a set, i.e. only ordering or formatting changed.
        set_equivalent: bool,
    },
}

/// Outcome of a passing validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub direction: Direction,
    pub symbols: Vec<String>,
    pub content_hash: String,
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

/// Lines trimmed, inner whitespace collapsed, trailing `,`/`=` dropped,
/// empty lines removed.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .map(|l| l.trim_end_matches(|c: char| c == ',' || c == '=').trim_end().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// BLAKE3 hex digest of the normalized lines.
pub fn content_hash(text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    for line in normalize_lines(text) {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Symbols named by a level text in either notation.
pub fn extract_symbols(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter_map(|l| l.split_once(':'))
        .map(|(symbol, _)| symbol.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Validate that `converted` (produced from `original` in `direction`) loses
/// nothing.
pub fn validate_round_trip(
    original: &str,
    converted: &str,
    direction: Direction,
) -> Result<ValidationReport, ValidationError> {
    let original_symbols = extract_symbols(original);
    let converted_symbols = extract_symbols(converted);
    if original_symbols != converted_symbols {
        return Err(ValidationError::SymbolMismatch {
            only_original: original_symbols
                .difference(&converted_symbols)
                .cloned()
                .collect(),
            only_converted: converted_symbols
                .difference(&original_symbols)
                .cloned()
                .collect(),
        });
    }

    let round_trip = transform(converted, direction.inverse());
    let original_hash = content_hash(original);
    let round_trip_hash = content_hash(&round_trip.value);

    if original_hash != round_trip_hash {
        let source = direction.source();
        let parsed = parse(original, source);
        let set_equivalent = parsed.warnings.is_empty()
            && round_trip.warnings.is_empty()
            && lines_equivalent(&parsed.value, &parse(&round_trip.value, source).value);
        return Err(ValidationError::HashMismatch {
            original: original_hash,
            round_trip: round_trip_hash,
            set_equivalent,
        });
    }

    Ok(ValidationReport {
        direction,
        symbols: original_symbols.into_iter().collect(),
        content_hash: original_hash,
        warnings: round_trip.warnings,
    })
}
