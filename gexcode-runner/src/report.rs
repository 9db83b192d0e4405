//! Extraction report — one CSV row per processed document.
//!
//! Columns: stock, date, gamma_code, level_code

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gexcode_core::store::{dated_file_name, write_atomic};

/// Report file prefix; the file is `gamma_extraction_report_<YYYYMMDD>.csv`.
pub const REPORT_PREFIX: &str = "gamma_extraction_report_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub stock: String,
    /// Document date as `YYYYMMDD`.
    pub date: String,
    pub gamma_code: String,
    pub level_code: String,
}

/// Render report rows as CSV with a header line.
pub fn export_report_csv(rows: &[ReportRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["stock", "date", "gamma_code", "level_code"])?;
    for row in rows {
        wtr.write_record([&row.stock, &row.date, &row.gamma_code, &row.level_code])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Parse a report back, e.g. to compare runs.
pub fn import_report_csv(text: &str) -> Result<Vec<ReportRow>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    rdr.deserialize()
        .collect::<Result<Vec<ReportRow>, _>>()
        .context("failed to parse extraction report")
}

/// Write the report into `dir`, named for `date`.
pub fn write_report(dir: &Path, date: NaiveDate, rows: &[ReportRow]) -> Result<PathBuf> {
    let path = dir.join(dated_file_name(REPORT_PREFIX, date, "csv"));
    let csv = export_report_csv(rows)?;
    write_atomic(&path, &csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(stock: &str) -> ReportRow {
        ReportRow {
            stock: stock.into(),
            date: "20250307".into(),
            gamma_code: " Γ_35M,6000.0,  Γ_14M,5900.0,".into(),
            level_code: "Gamma Flip ,5880.5 ,".into(),
        }
    }

    #[test]
    fn header_and_quoting() {
        let csv = export_report_csv(&[row("SPX")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("stock,date,gamma_code,level_code"));
        // commas inside codes force quoting
        assert_eq!(
            lines.next(),
            Some("SPX,20250307,\" Γ_35M,6000.0,  Γ_14M,5900.0,\",\"Gamma Flip ,5880.5 ,\"")
        );
    }

    #[test]
    fn export_then_import() {
        let rows = vec![row("SPX"), row("QQQ")];
        let csv = export_report_csv(&rows).unwrap();
        assert_eq!(import_report_csv(&csv).unwrap(), rows);
    }

    #[test]
    fn written_with_dated_name() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let path = write_report(dir.path(), date, &[row("SPX")]).unwrap();
        assert!(path.ends_with("gamma_extraction_report_20250307.csv"));
        assert!(std::fs::read_to_string(path).unwrap().starts_with("stock,"));
    }
}
