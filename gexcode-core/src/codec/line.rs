//! `LevelLine` — the per-instrument unit both notations encode.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::labels::LevelCode;

/// A price as written in a level text.
///
/// Grouping and ordering use the parsed value; output re-emits the literal it
/// was read from so `500` stays `500` and `500.25` stays `500.25`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    value: f64,
    literal: String,
}

impl Price {
    /// Parse an unsigned decimal literal (`500`, `500.25`, `.5`).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Self {
            value,
            literal: text.to_string(),
        })
    }

    /// A price produced from a number rather than read from text.
    pub fn from_value(value: f64) -> Self {
        Self {
            value,
            literal: value.to_string(),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    fn key(&self) -> u64 {
        if self.value == 0.0 {
            0
        } else {
            self.value.to_bits()
        }
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Codes sharing one price, in first-seen order without duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub price: Price,
    pub codes: Vec<LevelCode>,
}

/// All levels of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLine {
    pub symbol: String,
    pub entries: Vec<LevelEntry>,
}

impl LevelLine {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            entries: Vec::new(),
        }
    }

    /// Add a code at a price, merging into an existing entry at the same price.
    pub fn add(&mut self, price: Price, code: LevelCode) {
        match self.entries.iter_mut().find(|e| e.price == price) {
            Some(entry) => {
                if !entry.codes.contains(&code) {
                    entry.codes.push(code);
                }
            }
            None => self.entries.push(LevelEntry {
                price,
                codes: vec![code],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every `(price, code)` pair on the line.
    pub fn pairs(&self) -> impl Iterator<Item = (&Price, LevelCode)> + '_ {
        self.entries
            .iter()
            .flat_map(|e| e.codes.iter().map(move |c| (&e.price, *c)))
    }

    /// Price of the first entry carrying `code`.
    pub fn price_of(&self, code: LevelCode) -> Option<f64> {
        self.pairs()
            .find(|(_, c)| *c == code)
            .map(|(p, _)| p.value())
    }

    /// Same symbol and the same `(price, code)` pairs, ignoring order.
    pub fn equivalent(&self, other: &LevelLine) -> bool {
        self.symbol == other.symbol && self.pair_set() == other.pair_set()
    }

    fn pair_set(&self) -> HashSet<(u64, LevelCode)> {
        self.pairs().map(|(p, c)| (p.key(), c)).collect()
    }
}

/// Compare two parsed texts instrument by instrument as sets.
pub fn lines_equivalent(left: &[LevelLine], right: &[LevelLine]) -> bool {
    left.len() == right.len()
        && left.iter().all(|l| {
            right
                .iter()
                .find(|r| r.symbol == l.symbol)
                .is_some_and(|r| l.equivalent(r))
        })
}
