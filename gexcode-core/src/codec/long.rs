//! Long-form level text: `SYMBOL: Label [& Label], price, Label, price, ...`
//!
//! Instruments are separated by blank lines. A block may wrap over several
//! lines; a line containing `:` always starts a new block.

use super::labels::LevelCode;
use super::line::{LevelLine, Price};
use crate::domain::{Decoded, Warning};

/// Separator between labels sharing a price.
pub const LABEL_JOINER: &str = "&";

/// Split long-form text into `(symbol, body)` blocks.
fn blocks(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            out.extend(current.take());
            continue;
        }
        match current.as_mut() {
            Some(block) if !line.contains(':') => {
                block.push(' ');
                block.push_str(line);
            }
            _ => {
                out.extend(current.take());
                current = Some(line.to_string());
            }
        }
    }
    out.extend(current);
    out
}

/// Parse long-form text. Unknown labels and labels without a price are
/// skipped with a warning.
pub fn parse_long(text: &str) -> Decoded<Vec<LevelLine>> {
    let mut lines = Vec::new();
    let mut warnings = Vec::new();

    for block in blocks(text) {
        let Some((symbol, body)) = block.split_once(':') else {
            warnings.push(Warning::Codec {
                symbol: String::new(),
                token: block.clone(),
                reason: "no symbol prefix".into(),
            });
            continue;
        };
        let symbol = symbol.trim();
        let mut line = LevelLine::new(symbol);

        let tokens: Vec<&str> = body
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let mut i = 0;
        while i < tokens.len() {
            let label_text = tokens[i];
            let Some(price) = tokens.get(i + 1).and_then(|t| Price::parse(t)) else {
                warnings.push(Warning::Codec {
                    symbol: symbol.to_string(),
                    token: label_text.to_string(),
                    reason: "label without a price".into(),
                });
                i += 1;
                continue;
            };

            for name in label_text.split(LABEL_JOINER).map(str::trim) {
                match LevelCode::parse_long(name) {
                    Some(code) => line.add(price.clone(), code),
                    None => warnings.push(Warning::Codec {
                        symbol: symbol.to_string(),
                        token: name.to_string(),
                        reason: "unknown level label".into(),
                    }),
                }
            }
            i += 2;
        }

        lines.push(line);
    }

    Decoded::new(lines, warnings)
}

/// Render one instrument as `SYMBOL: Label & Label, price, Label, price`.
pub fn render_long_line(line: &LevelLine) -> String {
    let groups: Vec<String> = line
        .entries
        .iter()
        .map(|e| {
            let labels: Vec<String> = e.codes.iter().map(LevelCode::long).collect();
            format!("{}, {}", labels.join(" & "), e.price)
        })
        .collect();
    if groups.is_empty() {
        format!("{}:", line.symbol)
    } else {
        format!("{}: {}", line.symbol, groups.join(", "))
    }
}

/// Render instruments as blank-line-separated blocks.
pub fn render_long(lines: &[LevelLine]) -> String {
    lines
        .iter()
        .map(render_long_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}
