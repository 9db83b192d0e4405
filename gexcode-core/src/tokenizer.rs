//! Argument tokenizer for a single chart-initialization call.
//!
//! Input is the text between the call's parentheses. The scanner tracks two
//! pieces of state:
//! - whether it is inside a double-quoted string (backslash escapes honored)
//! - bracket depth over `{ [` / `} ]`, counted only outside strings
//!
//! A comma at depth zero outside a string ends an argument. Each fragment is
//! then decoded as JSON. A fragment that fails to decode is dropped with a
//! warning; the remaining arguments keep their original positions.

use serde_json::Value;

use crate::domain::{Decoded, Warning};

/// One decoded top-level argument and its position in the call.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub position: usize,
    pub value: Value,
}

/// Decoded arguments of one call, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizedArguments {
    args: Vec<Argument>,
}

impl TokenizedArguments {
    /// Argument at the given call position, if it decoded.
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.args
            .iter()
            .find(|a| a.position == position)
            .map(|a| &a.value)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.args.iter().map(|a| &a.value)
    }
}

/// Split argument-list text into top-level fragments.
///
/// Fragments are trimmed; empty fragments (consecutive commas, trailing comma)
/// are skipped.
pub fn split_arguments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut depth: i64 = 0;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            ',' if depth == 0 => {
                push_fragment(&mut fragments, &text[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    push_fragment(&mut fragments, &text[start..]);

    fragments
}

fn push_fragment<'a>(fragments: &mut Vec<&'a str>, raw: &'a str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed);
    }
}

/// Split and decode every top-level argument.
pub fn tokenize(text: &str) -> Decoded<TokenizedArguments> {
    let mut args = Vec::new();
    let mut warnings = Vec::new();

    for (position, fragment) in split_arguments(text).into_iter().enumerate() {
        match serde_json::from_str::<Value>(fragment) {
            Ok(value) => args.push(Argument { position, value }),
            Err(e) => warnings.push(Warning::ArgumentDecode {
                position,
                fragment: abbreviate(fragment),
                message: e.to_string(),
            }),
        }
    }

    Decoded::new(TokenizedArguments { args }, warnings)
}

/// Keep warning text readable when a fragment is a multi-kilobyte blob.
fn abbreviate(fragment: &str) -> String {
    const MAX_CHARS: usize = 80;
    match fragment.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &fragment[..cut]),
        None => fragment.to_string(),
    }
}
