//! Day-over-day comparison of two short-code snapshots.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::codec::{LevelCode, LevelLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Moved,
}

/// One level code whose prices differ between the two days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelChange {
    pub code: LevelCode,
    pub previous: Vec<f64>,
    pub current: Vec<f64>,
}

impl LevelChange {
    pub fn kind(&self) -> ChangeKind {
        match (self.previous.is_empty(), self.current.is_empty()) {
            (true, _) => ChangeKind::Added,
            (_, true) => ChangeKind::Removed,
            _ => ChangeKind::Moved,
        }
    }
}

fn join_prices(prices: &[f64]) -> String {
    prices
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

impl fmt::Display for LevelChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code.short();
        match self.kind() {
            ChangeKind::Added => write!(f, "{code} added at {}", join_prices(&self.current)),
            ChangeKind::Removed => write!(f, "{code} removed (was {})", join_prices(&self.previous)),
            ChangeKind::Moved => write!(
                f,
                "{code} {} -> {}",
                join_prices(&self.previous),
                join_prices(&self.current)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolDiff {
    pub symbol: String,
    pub changes: Vec<LevelChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotDiff {
    /// Symbols on both days with at least one change, in symbol order.
    pub changed: Vec<SymbolDiff>,
    pub only_previous: Vec<String>,
    pub only_current: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.only_previous.is_empty() && self.only_current.is_empty()
    }
}

/// Prices per code, each list sorted ascending.
fn prices_by_code(line: &LevelLine) -> BTreeMap<LevelCode, Vec<f64>> {
    let mut map: BTreeMap<LevelCode, Vec<f64>> = BTreeMap::new();
    for (price, code) in line.pairs() {
        map.entry(code).or_default().push(price.value());
    }
    for prices in map.values_mut() {
        prices.sort_by(f64::total_cmp);
    }
    map
}

fn diff_line(previous: &LevelLine, current: &LevelLine) -> Vec<LevelChange> {
    let before = prices_by_code(previous);
    let after = prices_by_code(current);
    let codes: BTreeSet<LevelCode> = before.keys().chain(after.keys()).copied().collect();

    codes
        .into_iter()
        .filter_map(|code| {
            let previous = before.get(&code).cloned().unwrap_or_default();
            let current = after.get(&code).cloned().unwrap_or_default();
            (previous != current).then_some(LevelChange {
                code,
                previous,
                current,
            })
        })
        .collect()
}

/// Compare two parsed snapshots symbol by symbol.
///
/// When a symbol appears on several lines of one snapshot the first line wins.
pub fn diff_snapshots(previous: &[LevelLine], current: &[LevelLine]) -> SnapshotDiff {
    let index = |lines: &[LevelLine]| -> BTreeMap<String, LevelLine> {
        let mut map = BTreeMap::new();
        for line in lines {
            map.entry(line.symbol.clone()).or_insert_with(|| line.clone());
        }
        map
    };
    let before = index(previous);
    let after = index(current);

    let mut diff = SnapshotDiff::default();
    for (symbol, line) in &before {
        match after.get(symbol) {
            Some(other) => {
                let changes = diff_line(line, other);
                if !changes.is_empty() {
                    diff.changed.push(SymbolDiff {
                        symbol: symbol.clone(),
                        changes,
                    });
                }
            }
            None => diff.only_previous.push(symbol.clone()),
        }
    }
    diff.only_current = after
        .keys()
        .filter(|s| !before.contains_key(*s))
        .cloned()
        .collect();
    diff
}
