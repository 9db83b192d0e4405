//! Extraction pipeline — locator → tokenizer → aggregator/annotations → selector → renderer.
//!
//! `extract_document` is the single entry point the runner calls per page.
//! Recoverable problems travel as warnings next to the result; only a page
//! with no usable chart call is an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::aggregate_series;
use crate::annotations::extract_levels;
use crate::domain::{Profile, ReferenceLevels, Warning};
use crate::locator::{LocateError, Locator};
use crate::render::{render_gamma_levels, render_line, render_reference_levels};
use crate::select::{select_significant, SignificanceIndexSet};
use crate::tokenizer::tokenize;

/// Call position of the series array (`newPlot(div, data, layout, config)`).
pub const SERIES_POSITION: usize = 1;
/// Call position of the layout object.
pub const LAYOUT_POSITION: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("chart call has no decodable series argument at position {position}")]
    MissingSeries { position: usize },
}

/// How levels are chosen and laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Share of profile points kept by magnitude, in percent.
    pub top_percentage: f64,
    /// Append the reference levels to the gamma levels on the output line.
    pub use_level_with_gamma: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            top_percentage: 10.0,
            use_level_with_gamma: true,
        }
    }
}

impl SelectionPolicy {
    /// Spaces before each gamma level: 1 when reference levels follow, 4 otherwise.
    pub fn right_shift(&self) -> usize {
        if self.use_level_with_gamma {
            1
        } else {
            4
        }
    }
}

/// A successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub profile: Profile,
    pub levels: ReferenceLevels,
    pub selected: SignificanceIndexSet,
    pub gamma_code: String,
    pub level_code: String,
    pub use_level_with_gamma: bool,
    pub warnings: Vec<Warning>,
}

impl Extraction {
    /// The `SYMBOL:<levels>` verbose line.
    pub fn line(&self, symbol: &str) -> String {
        let levels = self.use_level_with_gamma.then_some(self.level_code.as_str());
        render_line(symbol, &self.gamma_code, levels)
    }
}

/// Outcome of running the pipeline over one document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Extracted(Extraction),
    /// The chart call was found but carried no bar data.
    Empty {
        levels: ReferenceLevels,
        warnings: Vec<Warning>,
    },
}

impl ExtractionResult {
    pub fn extraction(&self) -> Option<&Extraction> {
        match self {
            ExtractionResult::Extracted(e) => Some(e),
            ExtractionResult::Empty { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            ExtractionResult::Extracted(e) => &e.warnings,
            ExtractionResult::Empty { warnings, .. } => warnings,
        }
    }
}

/// Run the whole pipeline over an HTML document.
pub fn extract_document(
    html: &str,
    policy: &SelectionPolicy,
) -> Result<ExtractionResult, ExtractError> {
    let arguments = Locator::default().locate(html)?;
    extract_from_arguments(&arguments, policy)
}

/// Run the pipeline over the raw argument-list text of the chart call.
pub fn extract_from_arguments(
    arguments: &str,
    policy: &SelectionPolicy,
) -> Result<ExtractionResult, ExtractError> {
    let tokenized = tokenize(arguments);
    let mut warnings = tokenized.warnings;
    let args = tokenized.value;

    let series = args
        .get(SERIES_POSITION)
        .ok_or(ExtractError::MissingSeries {
            position: SERIES_POSITION,
        })?;
    let aggregated = aggregate_series(series);
    warnings.extend(aggregated.warnings);
    let profile = aggregated.value;

    let levels = args
        .get(LAYOUT_POSITION)
        .map(extract_levels)
        .unwrap_or_default();

    if profile.is_empty() {
        return Ok(ExtractionResult::Empty { levels, warnings });
    }

    let selected = select_significant(&profile, policy.top_percentage, levels.delta_25);
    let gamma_code = render_gamma_levels(&profile, &selected, policy.right_shift());
    let level_code = render_reference_levels(&levels);

    Ok(ExtractionResult::Extracted(Extraction {
        profile,
        levels,
        selected,
        gamma_code,
        level_code,
        use_level_with_gamma: policy.use_level_with_gamma,
        warnings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGS: &str = r#""gex", [
        {"type": "bar", "orientation": "h", "y": [500, 510, 520, 530], "x": [-2000000, 500000, 9000000, 3000000]},
        {"type": "scatter", "y": [500], "x": [1]}
    ], {
        "annotations": [
            {"text": "Γ Flip", "xanchor": "right", "x": 0, "y": 512.5},
            {"text": "Call Wall", "xanchor": "right", "x": 0, "y": 530},
            {"text": "Δ 25", "xanchor": "right", "x": 2500000, "y": 0}
        ]
    }, {"responsive": true}"#;

    #[test]
    fn extracts_levels_from_arguments() {
        let result = extract_from_arguments(ARGS, &SelectionPolicy::default()).unwrap();
        let extraction = result.extraction().unwrap();

        assert_eq!(extraction.profile.len(), 4);
        // top 10% of 4 → 1 (index 2); threshold 2.5M adds index 3
        assert_eq!(extraction.selected, SignificanceIndexSet::from([2, 3]));
        assert_eq!(extraction.gamma_code, " Γ_3M,530.0,  Γ_9M,520.0,");
        assert_eq!(extraction.level_code, "Gamma Flip ,512.5 ,Call Wall ,530.0 ,");
        assert_eq!(
            extraction.line("QQQ"),
            "QQQ:Γ_3M,530.0,  Γ_9M,520.0, Gamma Flip ,512.5 ,Call Wall ,530.0"
        );
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn gamma_only_layout_pads_four() {
        let policy = SelectionPolicy {
            top_percentage: 10.0,
            use_level_with_gamma: false,
        };
        let result = extract_from_arguments(ARGS, &policy).unwrap();
        let extraction = result.extraction().unwrap();
        assert!(extraction.gamma_code.starts_with("    Γ_3M"));
        assert_eq!(extraction.line("QQQ"), "QQQ:Γ_3M,530.0,     Γ_9M,520.0");
    }

    #[test]
    fn undecodable_layout_keeps_series() {
        let args = r#""gex", [{"type":"bar","y":[1,2],"x":[5,6]}], {annotations: oops}"#;
        let result = extract_from_arguments(args, &SelectionPolicy::default()).unwrap();
        let extraction = result.extraction().unwrap();
        assert_eq!(extraction.levels, ReferenceLevels::default());
        assert_eq!(extraction.warnings.len(), 1);
    }

    #[test]
    fn no_bars_is_empty_not_error() {
        let args = r#""gex", [{"type":"scatter","y":[1],"x":[1]}], {}"#;
        let result = extract_from_arguments(args, &SelectionPolicy::default()).unwrap();
        assert!(matches!(result, ExtractionResult::Empty { .. }));
        assert!(result.extraction().is_none());
    }

    #[test]
    fn missing_series_is_error() {
        let err = extract_from_arguments(r#""gex""#, &SelectionPolicy::default()).unwrap_err();
        assert_eq!(err, ExtractError::MissingSeries { position: 1 });
    }

    #[test]
    fn document_without_call_fails() {
        let err = extract_document("<html><body><p>nothing</p></body></html>", &SelectionPolicy::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Locate(LocateError::NoMatchingScript { .. })));
    }
}
