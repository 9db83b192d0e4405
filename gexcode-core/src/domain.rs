//! Pipeline value types: exposure profile, reference levels, warnings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Aggregated exposure at one price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposurePoint {
    pub price: f64,
    pub exposure: f64,
}

impl ExposurePoint {
    pub fn new(price: f64, exposure: f64) -> Self {
        Self { price, exposure }
    }
}

/// Price-indexed exposure profile.
///
/// Invariant: at most one point per distinct price, sorted ascending by price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    points: Vec<ExposurePoint>,
}

impl Profile {
    /// Build a profile from raw `(price, exposure)` contributions.
    ///
    /// Contributions at the same price are summed in input order. Prices are
    /// keyed by their exact bit pattern; `-0.0` and `0.0` are the same key.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = ExposurePoint>,
    {
        let mut totals: HashMap<u64, ExposurePoint> = HashMap::new();
        for p in points {
            let price = if p.price == 0.0 { 0.0 } else { p.price };
            totals
                .entry(price.to_bits())
                .and_modify(|acc| acc.exposure += p.exposure)
                .or_insert(ExposurePoint::new(price, p.exposure));
        }

        let mut points: Vec<ExposurePoint> = totals.into_values().collect();
        points.sort_by(|a, b| a.price.total_cmp(&b.price));
        Self { points }
    }

    pub fn points(&self) -> &[ExposurePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&ExposurePoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExposurePoint> {
        self.points.iter()
    }
}

/// Horizontal anchor of a chart annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Left,
    Right,
}

impl Anchor {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Anchor::Left),
            "right" => Some(Anchor::Right),
            _ => None,
        }
    }
}

/// A named scalar marker read from the chart annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLevel {
    pub label: String,
    pub value: f64,
    pub anchor: Anchor,
}

/// The reference levels a document can carry. `None` means the marker was
/// absent; it is never a price of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLevels {
    pub gamma_field: Option<f64>,
    pub gamma_flip: Option<f64>,
    pub call_wall: Option<f64>,
    pub put_wall: Option<f64>,
    /// Delta-25 exposure threshold used by the selector.
    pub delta_25: Option<f64>,
}

/// Recoverable problem recorded while producing a best-effort result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("argument {position} is not valid structured data ({message}): {fragment}")]
    ArgumentDecode {
        position: usize,
        fragment: String,
        message: String,
    },

    #[error("series {series}: {message}")]
    Series { series: usize, message: String },

    #[error("{symbol}: skipped '{token}' ({reason})")]
    Codec {
        symbol: String,
        token: String,
        reason: String,
    },
}

/// A best-effort value together with the warnings collected while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Decoded<T> {
    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_merges_duplicate_prices() {
        let profile = Profile::from_points([
            ExposurePoint::new(100.0, 5.0),
            ExposurePoint::new(99.0, 1.0),
            ExposurePoint::new(100.0, 5.0),
        ]);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.points()[0], ExposurePoint::new(99.0, 1.0));
        assert_eq!(profile.points()[1], ExposurePoint::new(100.0, 10.0));
    }

    #[test]
    fn profile_treats_negative_zero_as_zero() {
        let profile =
            Profile::from_points([ExposurePoint::new(-0.0, 1.0), ExposurePoint::new(0.0, 2.0)]);
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.points()[0].exposure, 3.0);
    }

    #[test]
    fn anchor_parse() {
        assert_eq!(Anchor::parse("right"), Some(Anchor::Right));
        assert_eq!(Anchor::parse("left"), Some(Anchor::Left));
        assert_eq!(Anchor::parse("center"), None);
    }
}
