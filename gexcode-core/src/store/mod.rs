//! Dated level artifacts on disk.
//!
//! - File names carry a `YYYYMMDD` stamp (`tvcode_`, `gammacode_`, `gamma_levels_`)
//! - Writes are atomic: write to `.tmp`, then rename into place
//! - `orig_<file>` backups are made once and never overwritten
//! - Snapshot lookup walks back over trading days

pub mod calendar;
pub mod diff;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::codec::{parse_short, LevelLine};
use crate::domain::Warning;

pub use calendar::{
    date_stamp, parse_date_stamp, previous_trading_day, trading_days_before, LOOKBACK_TRADING_DAYS,
};
pub use diff::{diff_snapshots, ChangeKind, LevelChange, SnapshotDiff, SymbolDiff};

/// Short-code snapshot prefix.
pub const SNAPSHOT_PREFIX: &str = "tvcode_";
/// Verbose batch output prefix.
pub const GAMMA_CODE_PREFIX: &str = "gammacode_";
/// Per-symbol level file prefix.
pub const LEVELS_PREFIX: &str = "gamma_levels_";
/// Prefix of the one-time backup of a converted file.
pub const BACKUP_PREFIX: &str = "orig_";

static DOCUMENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Gamma_(\w+)_(\d{8})\.html$").expect("static regex"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no snapshot on or before {date} within {lookback} trading days in {dir}")]
    NoSnapshot {
        dir: PathBuf,
        date: NaiveDate,
        lookback: usize,
    },

    #[error("{path} is not a dated artifact name")]
    Undated { path: PathBuf },
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ─── File names ──────────────────────────────────────────────────────

/// `<prefix><YYYYMMDD>.<ext>`
pub fn dated_file_name(prefix: &str, date: NaiveDate, ext: &str) -> String {
    format!("{prefix}{}.{ext}", date_stamp(date))
}

/// Symbol and date of a `Gamma_<SYMBOL>_<YYYYMMDD>.html` document name.
pub fn parse_document_name(name: &str) -> Option<(String, NaiveDate)> {
    let caps = DOCUMENT_NAME.captures(name)?;
    let date = parse_date_stamp(&caps[2])?;
    Some((caps[1].to_string(), date))
}

/// `orig_<name>` next to `path`.
pub fn backup_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(format!("{BACKUP_PREFIX}{name}")))
}

// ─── Reads and writes ────────────────────────────────────────────────

pub fn read_text(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|e| io_err(path, e))
}

/// Write `contents` to `path` atomically, creating parent directories.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp_path = path.with_extension(match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.tmp"),
        None => "tmp".to_string(),
    });
    fs::write(&tmp_path, contents).map_err(|e| io_err(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_err(path, e)
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}

/// Copy `path` to `orig_<name>` unless that backup already exists.
///
/// Returns the backup path when a copy was made.
pub fn backup_once(path: &Path) -> Result<Option<PathBuf>, StoreError> {
    let backup = backup_path(path).ok_or_else(|| StoreError::Undated {
        path: path.to_path_buf(),
    })?;
    if backup.exists() {
        debug!(backup = %backup.display(), "backup already present");
        return Ok(None);
    }
    fs::copy(path, &backup).map_err(|e| io_err(path, e))?;
    debug!(backup = %backup.display(), "backed up original");
    Ok(Some(backup))
}

// ─── Snapshots ───────────────────────────────────────────────────────

/// Directory of `tvcode_YYYYMMDD.txt` short-code snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

/// A snapshot read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub lines: Vec<LevelLine>,
    pub warnings: Vec<Warning>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(dated_file_name(SNAPSHOT_PREFIX, date, "txt"))
    }

    pub fn save(&self, date: NaiveDate, text: &str) -> Result<PathBuf, StoreError> {
        let path = self.path_for(date);
        write_atomic(&path, text)?;
        Ok(path)
    }

    /// Snapshot for exactly `date`, or `None` if the file does not exist.
    pub fn load(&self, date: NaiveDate) -> Result<Option<Snapshot>, StoreError> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(None);
        }
        let decoded = parse_short(&read_text(&path)?);
        Ok(Some(Snapshot {
            date,
            path,
            lines: decoded.value,
            warnings: decoded.warnings,
        }))
    }

    /// Most recent snapshot strictly before `date`, searching back up to
    /// `LOOKBACK_TRADING_DAYS` trading days.
    pub fn previous(&self, date: NaiveDate) -> Result<Snapshot, StoreError> {
        for day in trading_days_before(date, LOOKBACK_TRADING_DAYS) {
            if let Some(snapshot) = self.load(day)? {
                debug!(date = %day, "found previous snapshot");
                return Ok(snapshot);
            }
        }
        Err(StoreError::NoSnapshot {
            dir: self.dir.clone(),
            date,
            lookback: LOOKBACK_TRADING_DAYS,
        })
    }

    /// Compare the snapshot for `date` with the previous trading day's.
    pub fn diff_with_previous(
        &self,
        date: NaiveDate,
    ) -> Result<(Snapshot, Snapshot, SnapshotDiff), StoreError> {
        let current = self.load(date)?.ok_or_else(|| StoreError::NoSnapshot {
            dir: self.dir.clone(),
            date,
            lookback: 0,
        })?;
        let previous = self.previous(date)?;
        let diff = diff_snapshots(&previous.lines, &current.lines);
        Ok((previous, current, diff))
    }
}

// ─── Per-symbol level files ──────────────────────────────────────────

/// Result of splitting a multi-symbol level text into per-symbol files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedLevels {
    pub written: Vec<PathBuf>,
    /// Lines without a `SYMBOL:` prefix.
    pub skipped: Vec<String>,
}

/// Write each `SYMBOL:levels` line to `<dir>/<SYMBOL>/gamma_levels_<date>.txt`.
pub fn save_levels(text: &str, output_dir: &Path, date: NaiveDate) -> Result<SavedLevels, StoreError> {
    let mut saved = SavedLevels::default();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((symbol, levels)) = line
            .split_once(':')
            .map(|(s, l)| (s.trim(), l.trim()))
            .filter(|(s, _)| !s.is_empty())
        else {
            saved.skipped.push(line.to_string());
            continue;
        };
        let path = output_dir
            .join(symbol)
            .join(dated_file_name(LEVELS_PREFIX, date, "txt"));
        write_atomic(&path, levels)?;
        saved.written.push(path);
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn names() {
        assert_eq!(dated_file_name(SNAPSHOT_PREFIX, d(2025, 3, 7), "txt"), "tvcode_20250307.txt");
        assert_eq!(
            parse_document_name("Gamma_SPX_20250307.html"),
            Some(("SPX".to_string(), d(2025, 3, 7)))
        );
        assert_eq!(
            parse_document_name("Gamma_BRK_B_20250307.html"),
            Some(("BRK_B".to_string(), d(2025, 3, 7)))
        );
        assert_eq!(parse_document_name("Gamma_SPX.html"), None);
    }

    #[test]
    fn backup_is_sibling() {
        assert_eq!(
            backup_path(Path::new("dir/tvcode_20250307.txt")),
            Some(PathBuf::from("dir/orig_tvcode_20250307.txt"))
        );
    }

    #[test]
    fn atomic_write_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tvcode_20250307.txt");
        write_atomic(&path, "QQQ:PW=500").unwrap();
        assert_eq!(read_text(&path).unwrap(), "QQQ:PW=500");
        assert!(!path.with_extension("txt.tmp").exists());
    }

    #[test]
    fn backup_happens_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tvcode_20250307.txt");
        fs::write(&path, "first").unwrap();
        assert!(backup_once(&path).unwrap().is_some());

        fs::write(&path, "second").unwrap();
        assert!(backup_once(&path).unwrap().is_none());
        let backup = backup_path(&path).unwrap();
        assert_eq!(fs::read_to_string(backup).unwrap(), "first");
    }

    #[test]
    fn previous_snapshot_skips_weekend() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save(d(2025, 3, 7), "QQQ:PW=500").unwrap(); // Friday
        store.save(d(2025, 3, 10), "QQQ:PW=505").unwrap(); // Monday

        let previous = store.previous(d(2025, 3, 10)).unwrap();
        assert_eq!(previous.date, d(2025, 3, 7));

        let (_, _, diff) = store.diff_with_previous(d(2025, 3, 10)).unwrap();
        assert_eq!(diff.changed.len(), 1);
    }

    #[test]
    fn lookback_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save(d(2025, 2, 28), "QQQ:PW=500").unwrap();
        // six trading days later
        let err = store.previous(d(2025, 3, 10)).unwrap_err();
        assert!(matches!(err, StoreError::NoSnapshot { lookback: 5, .. }));
        assert!(store.previous(d(2025, 3, 7)).is_ok());
    }

    #[test]
    fn levels_split_per_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let text = "SPY:Γ_28M,530.0\n\nbroken line\nQQQ: Γ_9M,480.0\n";
        let saved = save_levels(text, dir.path(), d(2025, 3, 7)).unwrap();
        assert_eq!(saved.written.len(), 2);
        assert_eq!(saved.skipped, vec!["broken line".to_string()]);
        let qqq = dir.path().join("QQQ").join("gamma_levels_20250307.txt");
        assert_eq!(fs::read_to_string(qqq).unwrap(), "Γ_9M,480.0");
    }
}
