//! Reference-level extraction from chart annotations.
//!
//! The layout argument carries `annotations: [{text, xanchor, x, y}, ...]`.
//! A marker matches on exact `text` and `xanchor == "right"`; the first match
//! wins. Missing markers stay `None`.

use serde_json::Value;

use crate::domain::{Anchor, ReferenceLevel, ReferenceLevels};

/// Named markers drawn on the exposure chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    GammaField,
    GammaFlip,
    CallWall,
    PutWall,
    Delta25,
}

/// Which annotation coordinate holds a marker's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Marker {
    pub const ALL: [Marker; 5] = [
        Marker::GammaField,
        Marker::GammaFlip,
        Marker::CallWall,
        Marker::PutWall,
        Marker::Delta25,
    ];

    /// Annotation text as drawn on the chart.
    pub fn text(self) -> &'static str {
        match self {
            Marker::GammaField => "\u{0393} Field",
            Marker::GammaFlip => "\u{0393} Flip",
            Marker::CallWall => "Call Wall",
            Marker::PutWall => "Put Wall",
            Marker::Delta25 => "\u{0394} 25",
        }
    }

    /// Price markers are horizontal lines (value on `y`); delta-25 is an
    /// exposure magnitude on the `x` axis.
    pub fn axis(self) -> Axis {
        match self {
            Marker::Delta25 => Axis::X,
            _ => Axis::Y,
        }
    }
}

/// First annotation matching the marker, as a reference level.
pub fn find_marker(layout: &Value, marker: Marker) -> Option<ReferenceLevel> {
    let annotations = layout.get("annotations")?.as_array()?;
    let key = match marker.axis() {
        Axis::X => "x",
        Axis::Y => "y",
    };

    annotations
        .iter()
        .find(|a| {
            a.get("text").and_then(Value::as_str) == Some(marker.text())
                && a.get("xanchor").and_then(Value::as_str).and_then(Anchor::parse)
                    == Some(Anchor::Right)
        })
        .and_then(|a| a.get(key)?.as_f64())
        .map(|value| ReferenceLevel {
            label: marker.text().to_string(),
            value,
            anchor: Anchor::Right,
        })
}

/// Extract all reference levels from the layout argument.
pub fn extract_levels(layout: &Value) -> ReferenceLevels {
    let value = |m| find_marker(layout, m).map(|l| l.value);
    ReferenceLevels {
        gamma_field: value(Marker::GammaField),
        gamma_flip: value(Marker::GammaFlip),
        call_wall: value(Marker::CallWall),
        put_wall: value(Marker::PutWall),
        delta_25: value(Marker::Delta25),
    }
}
