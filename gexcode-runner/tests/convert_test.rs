//! Integration tests for file conversion.
//!
//! Tests:
//! 1. Encode backs up the original once and overwrites the input
//! 2. Decode writes orig_<file> and leaves the input alone
//! 3. Forced conversions write despite a failed validation

use std::fs;

use gexcode_core::codec::{Direction, ValidationError};
use gexcode_runner::convert::{convert_file, ConvertOptions};

const LONG: &str = "SPY: Put Wall, 570, Call Wall, 600\n\nQQQ: Put Wall & Put Dominate, 480, Gamma Flip CE, 490";
const SHORT: &str = "SPY:PW=570=CW=600\nQQQ:PW,PD=480=GFCE=490";

// ── 1. Encode ────────────────────────────────────────────────────────

#[test]
fn encode_backs_up_once_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tvcode_20250307.txt");
    fs::write(&input, LONG).unwrap();

    let outcome = convert_file(&input, &ConvertOptions::default()).unwrap();
    assert!(!outcome.forced());
    assert_eq!(outcome.output, input);
    assert_eq!(fs::read_to_string(&input).unwrap(), SHORT);

    let backup = dir.path().join("orig_tvcode_20250307.txt");
    assert_eq!(outcome.backup.as_deref(), Some(backup.as_path()));
    assert_eq!(fs::read_to_string(&backup).unwrap(), LONG);

    // a second run over an edited long file keeps the first backup
    fs::write(&input, "SPY: Put Wall, 575").unwrap();
    let again = convert_file(&input, &ConvertOptions::default()).unwrap();
    assert!(again.backup.is_none());
    assert_eq!(fs::read_to_string(&backup).unwrap(), LONG);
}

#[test]
fn encode_accepts_unsorted_prices() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tvcode_20250307.txt");
    fs::write(&input, "QQQ: Call Wall, 520, Put Wall, 500").unwrap();

    let outcome = convert_file(&input, &ConvertOptions::default()).unwrap();
    assert!(!outcome.forced());
    assert_eq!(fs::read_to_string(&input).unwrap(), "QQQ:CW=520=PW=500");
}

// ── 2. Decode ────────────────────────────────────────────────────────

#[test]
fn decode_writes_orig_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tvcode_20250307.txt");
    fs::write(&input, SHORT).unwrap();

    let options = ConvertOptions {
        direction: Direction::Decode,
        ..ConvertOptions::default()
    };
    let outcome = convert_file(&input, &options).unwrap();
    assert_eq!(outcome.output, dir.path().join("orig_tvcode_20250307.txt"));
    assert_eq!(fs::read_to_string(&outcome.output).unwrap(), LONG);
    assert_eq!(fs::read_to_string(&input).unwrap(), SHORT);
    assert!(outcome.backup.is_none());
}

#[test]
fn decode_overwrite_replaces_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("levels.txt");
    fs::write(&input, SHORT).unwrap();

    let options = ConvertOptions {
        direction: Direction::Decode,
        overwrite: true,
        force: false,
    };
    convert_file(&input, &options).unwrap();
    assert_eq!(fs::read_to_string(&input).unwrap(), LONG);
}

// ── 3. Forced ────────────────────────────────────────────────────────

#[test]
fn force_writes_regrouped_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tvcode_20250307.txt");
    fs::write(&input, "QQQ: Put Wall, 500, Call Wall, 520, Put Dominate, 500").unwrap();

    let options = ConvertOptions {
        force: true,
        ..ConvertOptions::default()
    };
    let outcome = convert_file(&input, &options).unwrap();
    assert!(outcome.forced());
    assert!(matches!(
        outcome.validation,
        Err(ValidationError::HashMismatch {
            set_equivalent: true,
            ..
        })
    ));
    assert_eq!(fs::read_to_string(&input).unwrap(), "QQQ:PW,PD=500=CW=520");
}
