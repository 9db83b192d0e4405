//! Verbose level rendering — the human-labeled `Γ_<mag>M,<price>,` notation.

use crate::domain::{Profile, ReferenceLevels};
use crate::select::SignificanceIndexSet;

/// Prefix of every gamma level token.
pub const GAMMA_PREFIX: &str = "\u{0393}_";

/// Shortest round-trip decimal, always with a fractional part (`530.0`).
pub fn format_price(price: f64) -> String {
    format!("{price:?}")
}

/// Exposure in millions: no decimals at or above one million, two below.
pub fn format_magnitude(exposure: f64) -> String {
    let mega = exposure / 1_000_000.0;
    if mega.abs() >= 1.0 {
        format!("{mega:.0}")
    } else {
        format!("{mega:.2}")
    }
}

/// Render the selected profile points, highest price first.
///
/// Each level is `<pad>Γ_<mag>M,<price>, ` where `<pad>` is `right_shift`
/// spaces; the joined text is right-trimmed. Indices outside the profile are
/// ignored.
pub fn render_gamma_levels(
    profile: &Profile,
    selected: &SignificanceIndexSet,
    right_shift: usize,
) -> String {
    let mut points: Vec<_> = selected.iter().filter_map(|&i| profile.get(i)).collect();
    points.sort_by(|a, b| b.price.total_cmp(&a.price));

    let pad = " ".repeat(right_shift);
    let mut out = String::new();
    for p in points {
        out.push_str(&format!(
            "{pad}{GAMMA_PREFIX}{}M,{}, ",
            format_magnitude(p.exposure),
            format_price(p.price)
        ));
    }
    out.trim_end().to_string()
}

/// Render the four reference levels as `<Label> ,<value> ,` pairs, skipping
/// absent ones.
pub fn render_reference_levels(levels: &ReferenceLevels) -> String {
    let pairs = [
        ("Gamma Field", levels.gamma_field),
        ("Gamma Flip", levels.gamma_flip),
        ("Call Wall", levels.call_wall),
        ("Put Wall", levels.put_wall),
    ];
    pairs
        .iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label} ,{} ,", format_price(v))))
        .collect()
}

/// One `SYMBOL:<levels>` output line with trailing separators trimmed.
pub fn render_line(symbol: &str, gamma_code: &str, level_code: Option<&str>) -> String {
    let mut body = gamma_code.trim().to_string();
    if let Some(levels) = level_code.filter(|l| !l.is_empty()) {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push_str(levels);
    }
    let body = body.trim_end().trim_end_matches(',').trim_end();
    format!("{symbol}:{body}")
}
