//! Integration tests for batch extraction over a temporary document tree.
//!
//! Tests:
//! 1. Today's documents are extracted, written to gammacode_<date>.txt and the CSV report
//! 2. `newest` picks the latest document per symbol and dates the output by the most common date
//! 3. Folders without documents and broken pages are reported, not fatal

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use gexcode_runner::batch::{run_batch, BatchOptions, DocumentOutcome};
use gexcode_runner::report::import_report_csv;
use gexcode_runner::Config;

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn page(prices: &[i64], exposures: &[i64], flip: f64) -> String {
    format!(
        r#"<html><body><div id="g"></div><script>
Plotly.newPlot("g", [{{"type": "bar", "orientation": "h", "y": {prices:?}, "x": {exposures:?}}}],
{{"annotations": [{{"text": "Γ Flip", "xanchor": "right", "x": 0, "y": {flip}}}]}}, {{}});
</script></body></html>"#
    )
}

fn write_doc(base: &Path, symbol: &str, stamp: &str, html: &str) {
    let dir = base.join(symbol).join("html");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("Gamma_{symbol}_{stamp}.html")), html).unwrap();
}

fn config_for(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.base_dir = root.join("GEX_file");
    config.paths.output_dir = root.join("gamma_codes");
    config
}

// ── 1. Today's documents ─────────────────────────────────────────────

#[test]
fn extracts_todays_documents() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    let base = &config.paths.base_dir;
    write_doc(base, "QQQ", "20250307", &page(&[480, 490], &[-3_000_000, 12_000_000], 485.0));
    write_doc(base, "SPY", "20250307", &page(&[570], &[5_000_000], 565.5));
    write_doc(base, "SPY", "20250306", &page(&[560], &[1_000_000], 555.0));

    let summary = run_batch(&config, &BatchOptions::for_today(d(2025, 3, 7))).unwrap();
    assert_eq!(summary.extracted().count(), 2);

    let gamma_path = summary.gamma_code_path.clone().unwrap();
    assert!(gamma_path.ends_with("gamma_code/gammacode_20250307.txt"));
    assert_eq!(
        fs::read_to_string(&gamma_path).unwrap(),
        "QQQ:Γ_12M,490.0, Gamma Flip ,485.0\nSPY:Γ_5M,570.0, Gamma Flip ,565.5\n"
    );

    let report = fs::read_to_string(summary.report_path.clone().unwrap()).unwrap();
    let rows = import_report_csv(&report).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].stock, "QQQ");
    assert_eq!(rows[0].date, "20250307");
    assert_eq!(rows[0].level_code, "Gamma Flip ,485.0 ,");
}

// ── 2. Newest mode ───────────────────────────────────────────────────

#[test]
fn newest_mode_uses_most_common_date() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config_for(root.path());
    config.render.use_level_with_gamma = false;
    let base = &config.paths.base_dir;
    write_doc(base, "IWM", "20250305", &page(&[210], &[2_000_000], 209.0));
    write_doc(base, "QQQ", "20250306", &page(&[480], &[3_000_000], 481.0));
    write_doc(base, "QQQ", "20250305", &page(&[470], &[3_000_000], 471.0));
    write_doc(base, "SPY", "20250306", &page(&[570], &[4_000_000], 571.0));

    let options = BatchOptions {
        newest: true,
        today: d(2025, 3, 10),
    };
    let summary = run_batch(&config, &options).unwrap();
    assert_eq!(summary.extracted().count(), 3);

    let gamma_path = summary.gamma_code_path.clone().unwrap();
    assert!(gamma_path.ends_with("gammacode_20250306.txt"));
    let text = fs::read_to_string(gamma_path).unwrap();
    assert!(text.contains("QQQ:Γ_3M,480.0\n"));

    // report is named for the run day
    assert!(summary
        .report_path
        .unwrap()
        .ends_with("gamma_extraction_report_20250310.csv"));
}

// ── 3. Skips and failures ────────────────────────────────────────────

#[test]
fn skips_and_failures_are_reported() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    let base = &config.paths.base_dir;
    write_doc(base, "SPY", "20250307", &page(&[570], &[5_000_000], 565.5));
    write_doc(base, "BAD", "20250307", "<html><script>console.log(1)</script></html>");
    write_doc(base, "OLD", "20250301", &page(&[1], &[1], 1.0));
    fs::create_dir_all(base.join("gamma_code")).unwrap();

    let summary = run_batch(&config, &BatchOptions::for_today(d(2025, 3, 7))).unwrap();

    assert_eq!(summary.failed_symbols(), vec!["BAD"]);
    assert!(summary
        .outcomes
        .iter()
        .any(|o| matches!(o, DocumentOutcome::Failed { document, .. } if document.symbol == "BAD")));
    let skipped: Vec<&str> = summary.skipped.iter().map(|s| s.folder.as_str()).collect();
    assert_eq!(skipped, vec!["OLD", "gamma_code"]);
    assert!(summary.gamma_code_path.is_some());
}

#[test]
fn missing_base_dir_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    assert!(run_batch(&config, &BatchOptions::for_today(d(2025, 3, 7))).is_err());
}
