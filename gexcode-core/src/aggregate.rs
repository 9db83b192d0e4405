//! Exposure aggregation — folds the chart's bar series into one profile.
//!
//! The exposure chart is horizontal: each `bar` series carries prices in `y`
//! and exposures in `x`, as parallel arrays. Contributions sharing an exact
//! price are summed; the result is sorted ascending by price.

use serde_json::Value;

use crate::domain::{Decoded, ExposurePoint, Profile, Warning};

/// Series kind that carries exposure data.
pub const BAR_KIND: &str = "bar";

/// Fold every bar series in the series argument into a profile.
///
/// Non-bar series are ignored. An argument that is not an array, or that has
/// no bar series, yields an empty profile.
pub fn aggregate_series(series_arg: &Value) -> Decoded<Profile> {
    let Some(series) = series_arg.as_array() else {
        return Decoded::clean(Profile::default());
    };

    let mut contributions = Vec::new();
    let mut warnings = Vec::new();

    for (index, item) in series.iter().enumerate() {
        if item.get("type").and_then(Value::as_str) != Some(BAR_KIND) {
            continue;
        }
        collect_bar(index, item, &mut contributions, &mut warnings);
    }

    Decoded::new(Profile::from_points(contributions), warnings)
}

fn collect_bar(
    index: usize,
    item: &Value,
    contributions: &mut Vec<ExposurePoint>,
    warnings: &mut Vec<Warning>,
) {
    let empty = Vec::new();
    let prices = item.get("y").and_then(Value::as_array).unwrap_or(&empty);
    let exposures = item.get("x").and_then(Value::as_array).unwrap_or(&empty);

    if prices.len() != exposures.len() {
        warnings.push(Warning::Series {
            series: index,
            message: format!(
                "{} prices but {} exposures; extra entries ignored",
                prices.len(),
                exposures.len()
            ),
        });
    }

    for (pos, (price, exposure)) in prices.iter().zip(exposures).enumerate() {
        match (as_number(price), as_number(exposure)) {
            (Some(price), Some(exposure)) => {
                contributions.push(ExposurePoint::new(price, exposure));
            }
            _ => warnings.push(Warning::Series {
                series: index,
                message: format!("entry {pos} is not numeric ({price}, {exposure})"),
            }),
        }
    }
}

/// Numbers, and numeric strings as some exports quote their axis values.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sums_same_price_across_series() {
        let series = json!([
            {"type": "bar", "y": [100], "x": [5]},
            {"type": "bar", "y": [100], "x": [5]},
        ]);
        let decoded = aggregate_series(&series);
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.value.points(), &[ExposurePoint::new(100.0, 10.0)]);
    }

    #[test]
    fn ignores_non_bar_series() {
        let series = json!([
            {"type": "scatter", "y": [1, 2], "x": [3, 4]},
            {"type": "bar", "y": [3, 1], "x": [-2.5, 7]},
        ]);
        let profile = aggregate_series(&series).value;
        assert_eq!(
            profile.points(),
            &[ExposurePoint::new(1.0, 7.0), ExposurePoint::new(3.0, -2.5)]
        );
    }

    #[test]
    fn no_bar_series_is_empty_profile() {
        let series = json!([{"type": "scatter", "y": [1], "x": [1]}]);
        assert!(aggregate_series(&series).value.is_empty());
        assert!(aggregate_series(&json!({"type": "bar"})).value.is_empty());
    }

    #[test]
    fn mismatched_lengths_warn_and_zip_shortest() {
        let series = json!([{"type": "bar", "y": [1, 2, 3], "x": [10, 20]}]);
        let decoded = aggregate_series(&series);
        assert_eq!(decoded.value.len(), 2);
        assert_eq!(decoded.warnings.len(), 1);
    }

    #[test]
    fn non_numeric_entries_are_skipped() {
        let series = json!([{"type": "bar", "y": [1, null, "3.5"], "x": [10, 20, 30]}]);
        let decoded = aggregate_series(&series);
        assert_eq!(
            decoded.value.points(),
            &[ExposurePoint::new(1.0, 10.0), ExposurePoint::new(3.5, 30.0)]
        );
        assert_eq!(decoded.warnings.len(), 1);
    }

    #[test]
    fn series_order_does_not_change_profile() {
        let a = json!({"type": "bar", "y": [101, 100], "x": [1, 2]});
        let b = json!({"type": "bar", "y": [100, 99], "x": [3, 4]});
        let forward = aggregate_series(&json!([a.clone(), b.clone()])).value;
        let backward = aggregate_series(&json!([b, a])).value;
        assert_eq!(forward, backward);
    }
}
