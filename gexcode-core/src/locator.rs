//! Document locator — finds the chart-initialization call in an HTML page.
//!
//! Scripts are read with `scraper`; the first script that mentions the call
//! name and is not the charting library itself is scanned for the call, and
//! the text between its parentheses is returned for the tokenizer.

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

/// Call the source pages use to draw the exposure chart.
pub const CHART_CALL: &str = "Plotly.newPlot";

/// Substring identifying the bundled library definition script.
pub const LIBRARY_MARKER: &str = "plotly.js";

#[derive(Debug, Error, PartialEq)]
pub enum LocateError {
    #[error("no script block contains '{call}'")]
    NoMatchingScript { call: String },

    #[error("'{call}' is never invoked with an argument list")]
    CallNotFound { call: String },

    #[error("argument list of '{call}' is not closed")]
    Unterminated { call: String },
}

/// Which call to look for and which scripts to skip.
#[derive(Debug, Clone)]
pub struct Locator {
    pub call_name: String,
    pub library_marker: String,
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            call_name: CHART_CALL.to_string(),
            library_marker: LIBRARY_MARKER.to_string(),
        }
    }
}

impl Locator {
    /// Argument-list text of the chart call inside an HTML document.
    pub fn locate(&self, html: &str) -> Result<String, LocateError> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("script").expect("static selector");

        let script = document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .find(|text| text.contains(&self.call_name) && !text.contains(&self.library_marker))
            .ok_or_else(|| LocateError::NoMatchingScript {
                call: self.call_name.clone(),
            })?;

        debug!(bytes = script.len(), call = %self.call_name, "found chart script");
        self.call_arguments(&script).map(str::to_string)
    }

    /// Argument-list text of the first invocation of the call in raw script text.
    pub fn call_arguments<'a>(&self, script: &'a str) -> Result<&'a str, LocateError> {
        let mut search_from = 0;
        while let Some(found) = script[search_from..].find(&self.call_name) {
            let after_name = search_from + found + self.call_name.len();
            let rest = &script[after_name..];
            let trimmed = rest.trim_start();
            if trimmed.starts_with('(') {
                let open = after_name + (rest.len() - trimmed.len());
                return matching_paren(script, open)
                    .map(|close| &script[open + 1..close])
                    .ok_or_else(|| LocateError::Unterminated {
                        call: self.call_name.clone(),
                    });
            }
            search_from = after_name;
        }
        Err(LocateError::CallNotFound {
            call: self.call_name.clone(),
        })
    }
}

/// Byte index of the `)` closing the `(` at `open`, skipping string contents.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth: i64 = 0;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in text[open..].char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => in_string = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return (ch == ')').then_some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Locate with the default call name.
pub fn locate_call(html: &str) -> Result<String, LocateError> {
    Locator::default().locate(html)
}
