//! Short-code level text: `SYMBOL:CODE[,CODE]=price=CODE=price`, one line
//! per instrument.

use super::labels::LevelCode;
use super::line::{LevelLine, Price};
use crate::domain::{Decoded, Warning};

/// Separator between a code group and its price, and between groups.
pub const GROUP_SEPARATOR: char = '=';

/// Parse short-code text. Unknown codes and malformed `codes=price` pairs
/// are skipped with a warning; the rest of the line is kept.
pub fn parse_short(text: &str) -> Decoded<Vec<LevelLine>> {
    let mut lines = Vec::new();
    let mut warnings = Vec::new();

    for raw in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((symbol, body)) = raw.split_once(':') else {
            warnings.push(Warning::Codec {
                symbol: String::new(),
                token: raw.to_string(),
                reason: "no symbol prefix".into(),
            });
            continue;
        };
        let symbol = symbol.trim();
        let mut line = LevelLine::new(symbol);

        let body = body.trim().trim_end_matches(GROUP_SEPARATOR);
        let parts: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split(GROUP_SEPARATOR).collect()
        };

        // A part is a price only when it parses as one; anything else opens
        // a new code group.
        let mut pending: Option<&str> = None;
        for part in parts.iter().map(|p| p.trim()) {
            match (pending.take(), Price::parse(part)) {
                (Some(codes), Some(price)) => add_group(&mut line, codes, price, &mut warnings),
                (None, Some(price)) => warnings.push(Warning::Codec {
                    symbol: symbol.to_string(),
                    token: price.to_string(),
                    reason: "price without codes".into(),
                }),
                (previous, None) => {
                    if let Some(codes) = previous {
                        warnings.push(dangling(symbol, codes));
                    }
                    pending = Some(part);
                }
            }
        }
        if let Some(codes) = pending {
            warnings.push(dangling(symbol, codes));
        }

        lines.push(line);
    }

    Decoded::new(lines, warnings)
}

fn dangling(symbol: &str, codes: &str) -> Warning {
    Warning::Codec {
        symbol: symbol.to_string(),
        token: codes.to_string(),
        reason: "codes without a price".into(),
    }
}

/// Add every code of a `CODE[,CODE]` group at `price`.
fn add_group(line: &mut LevelLine, codes: &str, price: Price, warnings: &mut Vec<Warning>) {
    let mut codes = codes.split(',').map(str::trim).filter(|c| !c.is_empty()).peekable();
    if codes.peek().is_none() {
        warnings.push(Warning::Codec {
            symbol: line.symbol.clone(),
            token: format!("{GROUP_SEPARATOR}{price}"),
            reason: "no codes".into(),
        });
        return;
    }
    for code in codes {
        match LevelCode::parse_short(code) {
            Some(level) => line.add(price.clone(), level),
            None => warnings.push(Warning::Codec {
                symbol: line.symbol.clone(),
                token: code.to_string(),
                reason: "unknown short code".into(),
            }),
        }
    }
}

/// Render one instrument as `SYMBOL:CODES=price=CODES=price`.
pub fn render_short_line(line: &LevelLine) -> String {
    let groups: Vec<String> = line
        .entries
        .iter()
        .map(|e| {
            let codes: Vec<String> = e.codes.iter().map(LevelCode::short).collect();
            format!("{}{GROUP_SEPARATOR}{}", codes.join(","), e.price)
        })
        .collect();
    format!("{}:{}", line.symbol, groups.join("="))
}

/// Render instruments one per line.
pub fn render_short(lines: &[LevelLine]) -> String {
    lines
        .iter()
        .map(render_short_line)
        .collect::<Vec<_>>()
        .join("\n")
}
