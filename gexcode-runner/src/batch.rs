//! Batch extraction over per-symbol document folders.
//!
//! Layout: `<base_dir>/<SYMBOL>/html/Gamma_<SYMBOL>_<YYYYMMDD>.html`.
//! One document per symbol is picked (today's, or the newest with
//! `newest`), documents are extracted in parallel, and two artifacts are
//! written:
//! - `<base_dir>/gamma_code/gammacode_<date>.txt`, one `SYMBOL:line` per
//!   instrument, dated with the most common document date
//! - `<output_dir>/gamma_extraction_report_<today>.csv`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use gexcode_core::pipeline::{extract_document, Extraction, ExtractionResult};
use gexcode_core::store::{
    date_stamp, dated_file_name, parse_document_name, write_atomic, GAMMA_CODE_PREFIX,
};
use gexcode_core::SelectionPolicy;

use crate::config::Config;
use crate::report::{write_report, ReportRow};

/// Name of the per-symbol folder holding documents.
pub const HTML_DIR: &str = "html";

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Pick each symbol's newest document instead of today's.
    pub newest: bool,
    pub today: NaiveDate,
}

impl BatchOptions {
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            newest: false,
            today,
        }
    }
}

/// A document chosen for extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDocument {
    pub symbol: String,
    pub date: NaiveDate,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Extracted {
        document: SymbolDocument,
        extraction: Extraction,
    },
    /// The chart was found but had no bar data.
    Empty { document: SymbolDocument },
    Failed {
        document: SymbolDocument,
        error: String,
    },
}

impl DocumentOutcome {
    pub fn document(&self) -> &SymbolDocument {
        match self {
            DocumentOutcome::Extracted { document, .. }
            | DocumentOutcome::Empty { document }
            | DocumentOutcome::Failed { document, .. } => document,
        }
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        match self {
            DocumentOutcome::Extracted { extraction, .. } => Some(extraction),
            _ => None,
        }
    }
}

/// A symbol folder that produced no document.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub folder: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<DocumentOutcome>,
    pub skipped: Vec<SkippedSymbol>,
    pub gamma_code_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

impl BatchSummary {
    pub fn extracted(&self) -> impl Iterator<Item = (&SymbolDocument, &Extraction)> {
        self.outcomes.iter().filter_map(|o| match o {
            DocumentOutcome::Extracted {
                document,
                extraction,
            } => Some((document, extraction)),
            _ => None,
        })
    }

    /// Symbols whose document failed or was empty.
    pub fn failed_symbols(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.extraction().is_none())
            .map(|o| o.document().symbol.as_str())
            .collect()
    }
}

// ─── Discovery ───────────────────────────────────────────────────────

/// The document to use from one `<SYMBOL>/html` folder.
pub fn pick_document(html_dir: &Path, options: &BatchOptions) -> Result<Option<SymbolDocument>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(html_dir)
        .with_context(|| format!("failed to read {}", html_dir.display()))?
    {
        let path = entry?.path();
        let Some((symbol, date)) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_document_name)
        else {
            continue;
        };
        candidates.push(SymbolDocument { symbol, date, path });
    }

    let picked = if options.newest {
        candidates
            .into_iter()
            .max_by(|a, b| a.date.cmp(&b.date).then_with(|| b.path.cmp(&a.path)))
    } else {
        candidates.sort_by(|a, b| a.path.cmp(&b.path));
        candidates.into_iter().find(|d| d.date == options.today)
    };
    Ok(picked)
}

/// Walk `base_dir` and pick one document per symbol folder, in folder order.
pub fn discover_documents(
    base_dir: &Path,
    options: &BatchOptions,
) -> Result<(Vec<SymbolDocument>, Vec<SkippedSymbol>)> {
    let mut folders: Vec<PathBuf> = fs::read_dir(base_dir)
        .with_context(|| format!("base directory {} is not readable", base_dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    folders.sort();

    let mut documents = Vec::new();
    let mut skipped = Vec::new();
    for folder in folders {
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let html_dir = folder.join(HTML_DIR);
        if !html_dir.is_dir() {
            debug!(folder = %name, "no html folder, not a symbol directory");
            skipped.push(SkippedSymbol {
                folder: name,
                reason: "no html folder".into(),
            });
            continue;
        }
        match pick_document(&html_dir, options)? {
            Some(doc) => documents.push(doc),
            None => {
                let reason = if options.newest {
                    "no Gamma_*.html document".to_string()
                } else {
                    format!("no document dated {}", date_stamp(options.today))
                };
                info!(folder = %name, %reason, "skipping symbol");
                skipped.push(SkippedSymbol {
                    folder: name,
                    reason,
                });
            }
        }
    }
    Ok((documents, skipped))
}

// ─── Extraction ──────────────────────────────────────────────────────

/// Read and extract one document. Never fails; problems become `Failed`.
pub fn process_document(document: SymbolDocument, policy: &SelectionPolicy) -> DocumentOutcome {
    let html = match fs::read_to_string(&document.path) {
        Ok(html) => html,
        Err(e) => {
            return DocumentOutcome::Failed {
                error: format!("failed to read {}: {e}", document.path.display()),
                document,
            }
        }
    };

    match extract_document(&html, policy) {
        Ok(ExtractionResult::Extracted(extraction)) => {
            for w in &extraction.warnings {
                warn!(symbol = %document.symbol, "{w}");
            }
            debug!(
                symbol = %document.symbol,
                points = extraction.profile.len(),
                selected = extraction.selected.len(),
                "extracted"
            );
            DocumentOutcome::Extracted {
                document,
                extraction,
            }
        }
        Ok(ExtractionResult::Empty { warnings, .. }) => {
            warn!(symbol = %document.symbol, warnings = warnings.len(), "chart has no bar data");
            DocumentOutcome::Empty { document }
        }
        Err(e) => DocumentOutcome::Failed {
            error: e.to_string(),
            document,
        },
    }
}

/// Most frequent document date; ties go to the first seen.
pub fn most_common_date<I>(dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut counts: Vec<(NaiveDate, usize)> = Vec::new();
    for date in dates {
        match counts.iter_mut().find(|(d, _)| *d == date) {
            Some((_, n)) => *n += 1,
            None => counts.push((date, 1)),
        }
    }
    let max = counts.iter().map(|(_, n)| *n).max()?;
    counts.into_iter().find(|(_, n)| *n == max).map(|(d, _)| d)
}

/// Discover, extract in parallel, write the verbose file and the report.
pub fn run_batch(config: &Config, options: &BatchOptions) -> Result<BatchSummary> {
    let base_dir = &config.paths.base_dir;
    let (documents, skipped) = discover_documents(base_dir, options)?;
    info!(documents = documents.len(), skipped = skipped.len(), "discovered documents");

    let policy = config.selection_policy();
    let outcomes: Vec<DocumentOutcome> = documents
        .into_par_iter()
        .map(|doc| process_document(doc, &policy))
        .collect();

    for outcome in &outcomes {
        if let DocumentOutcome::Failed { document, error } = outcome {
            warn!(symbol = %document.symbol, %error, "extraction failed");
        }
    }

    let mut summary = BatchSummary {
        outcomes,
        skipped,
        ..BatchSummary::default()
    };

    let extracted: Vec<(&SymbolDocument, &Extraction)> = summary.extracted().collect();
    if extracted.is_empty() {
        warn!("no documents extracted, nothing written");
        return Ok(summary);
    }

    let date = most_common_date(extracted.iter().map(|(d, _)| d.date)).unwrap_or(options.today);
    let lines: Vec<String> = extracted.iter().map(|(d, e)| e.line(&d.symbol)).collect();
    let gamma_path = config
        .paths
        .gamma_code_dir()
        .join(dated_file_name(GAMMA_CODE_PREFIX, date, "txt"));
    write_atomic(&gamma_path, &(lines.join("\n") + "\n"))
        .with_context(|| format!("failed to write {}", gamma_path.display()))?;
    info!(path = %gamma_path.display(), symbols = lines.len(), "wrote gamma codes");

    let rows: Vec<ReportRow> = extracted
        .iter()
        .map(|(d, e)| ReportRow {
            stock: d.symbol.clone(),
            date: date_stamp(d.date),
            gamma_code: e.gamma_code.clone(),
            level_code: e.level_code.clone(),
        })
        .collect();
    let report_path = write_report(&config.paths.output_dir, options.today, &rows)?;
    info!(path = %report_path.display(), rows = rows.len(), "wrote extraction report");

    summary.gamma_code_path = Some(gamma_path);
    summary.report_path = Some(report_path);
    Ok(summary)
}
