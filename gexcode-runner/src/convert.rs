//! Validated conversion of a level file between notations.
//!
//! `Read → Transform → Validate → {write | write anyway (forced) | abort}`.
//! An aborted conversion leaves every file as it was; the `orig_` backup
//! is only taken once a write is going to happen.
//!
//! Output placement:
//! - `overwrite`: the input file itself
//! - encode (long → short): the input file, after backing it up as `orig_<file>`
//! - decode (short → long): `orig_<file>` next to the input

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use gexcode_core::codec::{transform, validate_round_trip, Direction, ValidationError, ValidationReport};
use gexcode_core::domain::Warning;
use gexcode_core::store::{backup_once, backup_path, read_text, write_atomic, StoreError};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file {0} does not exist")]
    MissingInput(PathBuf),

    #[error("conversion of {path} rejected: {source}")]
    Rejected {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub direction: Direction,
    pub overwrite: bool,
    /// Write even when validation fails.
    pub force: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Encode,
            overwrite: false,
            force: false,
        }
    }
}

/// What a finished conversion did.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub backup: Option<PathBuf>,
    pub converted: String,
    /// `Ok` when validation passed, `Err` when the write was forced.
    pub validation: Result<ValidationReport, ValidationError>,
    pub warnings: Vec<Warning>,
}

impl ConvertOutcome {
    pub fn forced(&self) -> bool {
        self.validation.is_err()
    }
}

/// Where the converted text goes for `input`.
pub fn output_path(input: &Path, options: &ConvertOptions) -> Result<PathBuf, ConvertError> {
    if options.overwrite || options.direction == Direction::Encode {
        return Ok(input.to_path_buf());
    }
    backup_path(input).ok_or_else(|| StoreError::Undated {
        path: input.to_path_buf(),
    }
    .into())
}

/// Convert `input` in place (or next to it) per `options`.
pub fn convert_file(input: &Path, options: &ConvertOptions) -> Result<ConvertOutcome, ConvertError> {
    if !input.exists() {
        return Err(ConvertError::MissingInput(input.to_path_buf()));
    }
    let original = read_text(input)?;
    debug!(path = %input.display(), bytes = original.len(), "read input");

    let converted = transform(&original, options.direction);
    for w in &converted.warnings {
        warn!("{w}");
    }
    debug!(direction = ?options.direction, "converted:\n{}", converted.value);

    let validation = validate_round_trip(&original, &converted.value, options.direction);
    match &validation {
        Ok(report) => debug!(hash = %report.content_hash, "round trip verified"),
        Err(e) if options.force => warn!(error = %e, "validation failed, writing anyway"),
        Err(e) => {
            return Err(ConvertError::Rejected {
                path: input.to_path_buf(),
                source: e.clone(),
            })
        }
    }

    let output = output_path(input, options)?;
    let backup = if !options.overwrite && options.direction == Direction::Encode {
        backup_once(input)?
    } else {
        None
    };
    write_atomic(&output, &converted.value)?;
    info!(output = %output.display(), "conversion written");

    Ok(ConvertOutcome {
        input: input.to_path_buf(),
        output,
        backup,
        converted: converted.value,
        validation,
        warnings: converted.warnings,
    })
}
