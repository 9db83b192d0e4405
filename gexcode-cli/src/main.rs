//! gexcode CLI — extraction, level conversion, and snapshot commands.
//!
//! Commands:
//! - `extract` — batch-extract today's (or the newest) exposure pages per symbol
//! - `convert` — long ↔ short level conversion with round-trip validation
//! - `save-levels` — split a `SYMBOL:levels` file into per-symbol dated files
//! - `diff` — compare a day's short-code snapshot with the previous trading day's

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use gexcode_core::codec::{Direction, ValidationError};
use gexcode_core::store::{
    date_stamp, dated_file_name, parse_date_stamp, read_text, save_levels, ChangeKind,
    SnapshotStore, SNAPSHOT_PREFIX,
};
use gexcode_runner::batch::{run_batch, BatchOptions, DocumentOutcome};
use gexcode_runner::convert::{convert_file, ConvertError, ConvertOptions};
use gexcode_runner::Config;

/// Config file read when `--config` is not given.
const DEFAULT_CONFIG: &str = "gexcode.toml";

#[derive(Parser)]
#[command(
    name = "gexcode",
    version,
    about = "gexcode: exposure-chart level extraction and level codes"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./gexcode.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract gamma levels from every symbol's exposure page.
    Extract {
        /// Use each symbol's newest page instead of today's.
        #[arg(long, default_value_t = false)]
        newest: bool,

        /// Root of the per-symbol page folders.
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Directory for the extraction report.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Share of levels kept by magnitude, in percent.
        #[arg(long)]
        top_percentage: Option<f64>,

        /// Also split the extracted lines into per-symbol level files.
        #[arg(long, default_value_t = false)]
        save_levels: bool,
    },
    /// Convert a level file between long labels and short codes.
    Convert {
        /// Short codes back to long labels.
        #[arg(short, long, default_value_t = false)]
        reverse: bool,

        /// Directory holding the file. Defaults to the configured tvcode_dir.
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// File name. Defaults to tvcode_<today>.txt.
        #[arg(short, long)]
        file: Option<String>,

        /// Write the result over the input file.
        #[arg(long, default_value_t = false)]
        overwrite: bool,

        /// Write even when round-trip validation fails.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Split a multi-line SYMBOL:levels file into <dir>/<SYMBOL>/gamma_levels_<date>.txt.
    SaveLevels {
        /// Input file with one SYMBOL:levels line per instrument.
        #[arg(long)]
        input: PathBuf,

        /// Output root. Defaults to the configured output_dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Date stamp (YYYYMMDD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Compare a short-code snapshot with the previous trading day's.
    Diff {
        /// Snapshot directory. Defaults to the configured tvcode_dir.
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Snapshot date (YYYYMMDD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Print the diff as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    config.logging.init(cli.debug);
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Extract {
            newest,
            base_dir,
            output_dir,
            top_percentage,
            save_levels,
        } => run_extract(config, newest, base_dir, output_dir, top_percentage, save_levels),
        Commands::Convert {
            reverse,
            path,
            file,
            overwrite,
            force,
        } => run_convert(&config, reverse, path, file, overwrite, force),
        Commands::SaveLevels {
            input,
            output_dir,
            date,
        } => run_save_levels(&config, &input, output_dir, date.as_deref()),
        Commands::Diff { path, date, json } => run_diff(&config, path, date.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(Config::load_or_default(Path::new(DEFAULT_CONFIG))?),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn parse_date_arg(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => match parse_date_stamp(s) {
            Some(d) => Ok(d),
            None => bail!("invalid date '{s}', expected YYYYMMDD"),
        },
        None => Ok(today()),
    }
}

// ─── extract ─────────────────────────────────────────────────────────

fn run_extract(
    mut config: Config,
    newest: bool,
    base_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    top_percentage: Option<f64>,
    split_levels: bool,
) -> Result<()> {
    if let Some(dir) = base_dir {
        config.paths.base_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.paths.output_dir = dir;
    }
    if let Some(pct) = top_percentage {
        if !(pct > 0.0 && pct <= 100.0) {
            bail!("--top-percentage must be in (0, 100], got {pct}");
        }
        config.selection.top_percentage = pct;
    }
    if !config.paths.base_dir.is_dir() {
        bail!("base directory {} does not exist", config.paths.base_dir.display());
    }

    let options = BatchOptions {
        newest,
        today: today(),
    };
    info!(base_dir = %config.paths.base_dir.display(), newest, "starting extraction");
    let summary = run_batch(&config, &options)?;

    for outcome in &summary.outcomes {
        match outcome {
            DocumentOutcome::Extracted {
                document,
                extraction,
            } => println!("{}", extraction.line(&document.symbol)),
            DocumentOutcome::Empty { document } => {
                eprintln!("{}: chart has no bar data", document.symbol)
            }
            DocumentOutcome::Failed { document, error } => {
                eprintln!("{}: {error}", document.symbol)
            }
        }
    }

    println!();
    println!("Processed: {}", summary.outcomes.len());
    println!("Extracted: {}", summary.extracted().count());
    let failed = summary.failed_symbols();
    if !failed.is_empty() {
        println!("Failed:    {}", failed.join(", "));
    }
    if !summary.skipped.is_empty() {
        let skipped: Vec<&str> = summary.skipped.iter().map(|s| s.folder.as_str()).collect();
        println!("Skipped:   {}", skipped.join(", "));
    }
    if let Some(path) = &summary.gamma_code_path {
        println!("Gamma codes written to: {}", path.display());
    }
    if let Some(path) = &summary.report_path {
        println!("Report written to: {}", path.display());
    }

    if split_levels {
        let lines: Vec<String> = summary
            .extracted()
            .map(|(d, e)| e.line(&d.symbol))
            .collect();
        let saved = save_levels(&lines.join("\n"), &config.paths.output_dir, options.today)?;
        println!("Saved {} per-symbol level files", saved.written.len());
    }

    Ok(())
}

// ─── convert ─────────────────────────────────────────────────────────

fn run_convert(
    config: &Config,
    reverse: bool,
    path: Option<PathBuf>,
    file: Option<String>,
    overwrite: bool,
    force: bool,
) -> Result<()> {
    let dir = path.unwrap_or_else(|| config.paths.tvcode_dir.clone());
    let file = file.unwrap_or_else(|| dated_file_name(SNAPSHOT_PREFIX, today(), "txt"));
    let input = dir.join(file);

    let options = ConvertOptions {
        direction: if reverse {
            Direction::Decode
        } else {
            Direction::Encode
        },
        overwrite,
        force,
    };

    match convert_file(&input, &options) {
        Ok(outcome) => {
            for w in &outcome.warnings {
                eprintln!("warning: {w}");
            }
            if let Err(e) = &outcome.validation {
                eprintln!("warning: written despite failed validation: {e}");
            }
            if let Some(backup) = &outcome.backup {
                println!("Original backed up to: {}", backup.display());
            }
            println!("Converted: {}", outcome.output.display());
            Ok(())
        }
        Err(ConvertError::Rejected { path, source }) => {
            eprintln!("Conversion of {} aborted: {source}", path.display());
            if let ValidationError::HashMismatch { set_equivalent, .. } = source {
                if set_equivalent {
                    eprintln!("The levels match as a set; only order or formatting differs.");
                } else {
                    eprintln!("Levels were dropped or changed; check the warnings above.");
                }
            }
            eprintln!("Nothing was written. Re-run with --force to write anyway.");
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

// ─── save-levels ─────────────────────────────────────────────────────

fn run_save_levels(
    config: &Config,
    input: &Path,
    output_dir: Option<PathBuf>,
    date: Option<&str>,
) -> Result<()> {
    let date = parse_date_arg(date)?;
    let output_dir = output_dir.unwrap_or_else(|| config.paths.output_dir.clone());
    let text = read_text(input)?;

    let saved = save_levels(&text, &output_dir, date)?;
    for line in &saved.skipped {
        eprintln!("warning: cannot parse line '{line}', skipped");
    }
    for path in &saved.written {
        println!("Saved: {}", path.display());
    }
    println!("{} symbols saved for {}", saved.written.len(), date_stamp(date));
    Ok(())
}

// ─── diff ────────────────────────────────────────────────────────────

fn run_diff(config: &Config, path: Option<PathBuf>, date: Option<&str>, json: bool) -> Result<()> {
    let date = parse_date_arg(date)?;
    let store = SnapshotStore::new(path.unwrap_or_else(|| config.paths.tvcode_dir.clone()));
    let (previous, current, diff) = store.diff_with_previous(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    println!(
        "Comparing {} with {}",
        current.path.display(),
        previous.path.display()
    );
    if diff.is_empty() {
        println!("No level changes.");
        return Ok(());
    }

    for symbol in &diff.changed {
        println!("{}:", symbol.symbol);
        for change in &symbol.changes {
            let marker = match change.kind() {
                ChangeKind::Added => '+',
                ChangeKind::Removed => '-',
                ChangeKind::Moved => '~',
            };
            println!("  {marker} {change}");
        }
    }
    if !diff.only_current.is_empty() {
        println!("New symbols: {}", diff.only_current.join(", "));
    }
    if !diff.only_previous.is_empty() {
        println!("Dropped symbols: {}", diff.only_previous.join(", "));
    }
    Ok(())
}
