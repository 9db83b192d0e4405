//! Significance selection over an exposure profile.
//!
//! Two independent cuts are unioned:
//! - the top `top_percentage`% of points by absolute exposure
//! - every point whose absolute exposure reaches the delta-25 threshold
//!
//! Ties in absolute exposure are broken by price-ascending index so the
//! result is deterministic.

use std::collections::BTreeSet;

use crate::domain::Profile;

/// Indices into a profile, ascending, no duplicates, all `< profile.len()`.
pub type SignificanceIndexSet = BTreeSet<usize>;

/// Profile indices ordered by `|exposure|` descending, ties by index.
pub fn rank_by_magnitude(profile: &Profile) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..profile.len()).collect();
    let points = profile.points();
    ranked.sort_by(|&a, &b| {
        points[b]
            .exposure
            .abs()
            .total_cmp(&points[a].exposure.abs())
            .then(a.cmp(&b))
    });
    ranked
}

/// `ceil(len × pct / 100)`, clamped to `[0, len]`.
pub fn top_count(len: usize, top_percentage: f64) -> usize {
    if len == 0 || top_percentage.is_nan() || top_percentage <= 0.0 {
        return 0;
    }
    let count = (len as f64 * top_percentage / 100.0).ceil();
    (count as usize).min(len)
}

/// The `top_count` largest-magnitude indices.
pub fn top_set(profile: &Profile, top_percentage: f64) -> SignificanceIndexSet {
    let count = top_count(profile.len(), top_percentage);
    rank_by_magnitude(profile).into_iter().take(count).collect()
}

/// Indices whose absolute exposure is at least `threshold`.
pub fn threshold_set(profile: &Profile, threshold: f64) -> SignificanceIndexSet {
    profile
        .iter()
        .enumerate()
        .filter(|(_, p)| p.exposure.abs() >= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Top set ∪ threshold set.
///
/// The threshold cut only applies when the threshold is present and
/// positive; an absent or non-positive threshold would otherwise select
/// every point.
pub fn select_significant(
    profile: &Profile,
    top_percentage: f64,
    threshold: Option<f64>,
) -> SignificanceIndexSet {
    let mut selected = top_set(profile, top_percentage);
    if let Some(t) = threshold.filter(|t| *t > 0.0) {
        selected.extend(threshold_set(profile, t));
    }
    selected
}
