//! Level codec — long-form labels ↔ short codes.
//!
//! - `labels`: the fixed label/code table and the CE modifier
//! - `line`: `LevelLine`, the per-instrument unit both notations share
//! - `long` / `short`: parse and render each notation
//! - `validate`: symbol-set and hash round-trip checks
//!
//! Both directions keep price groups in the order they were first read.

pub mod labels;
pub mod line;
pub mod long;
pub mod short;
pub mod validate;

use serde::{Deserialize, Serialize};

use crate::domain::Decoded;

pub use labels::{LevelCode, LevelLabel, CE_SUFFIX};
pub use line::{lines_equivalent, LevelEntry, LevelLine, Price};
pub use long::{parse_long, render_long};
pub use short::{parse_short, render_short};
pub use validate::{content_hash, extract_symbols, validate_round_trip, ValidationError, ValidationReport};

/// One of the two level notations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    Long,
    Short,
}

/// Conversion direction. `Encode` is long → short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::Encode => Direction::Decode,
            Direction::Decode => Direction::Encode,
        }
    }

    /// Notation of the input text.
    pub fn source(self) -> Notation {
        match self {
            Direction::Encode => Notation::Long,
            Direction::Decode => Notation::Short,
        }
    }

    /// Notation of the output text.
    pub fn target(self) -> Notation {
        self.inverse().source()
    }
}

/// Parse text in the given notation.
pub fn parse(text: &str, notation: Notation) -> Decoded<Vec<LevelLine>> {
    match notation {
        Notation::Long => parse_long(text),
        Notation::Short => parse_short(text),
    }
}

/// Convert text in `direction`, collecting codec warnings.
pub fn transform(text: &str, direction: Direction) -> Decoded<String> {
    match direction {
        Direction::Encode => encode_long_to_short(text),
        Direction::Decode => decode_short_to_long(text),
    }
}

/// Long → short, one line per instrument.
pub fn encode_long_to_short(text: &str) -> Decoded<String> {
    parse_long(text).map(|lines| render_short(&lines))
}

/// Short → long, blocks joined by a blank line.
pub fn decode_short_to_long(text: &str) -> Decoded<String> {
    parse_short(text).map(|lines| render_long(&lines))
}
