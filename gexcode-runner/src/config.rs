//! TOML configuration for batch runs and conversions.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [paths]
//! base_dir = "GEX_file"
//! output_dir = "gamma_codes"
//! tvcode_dir = "GEX_file/tvcode"
//!
//! [selection]
//! top_percentage = 10.0
//!
//! [render]
//! use_level_with_gamma = true
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use gexcode_core::SelectionPolicy;

use crate::logging::LoggingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where documents are read from and artifacts are written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the per-symbol document folders.
    pub base_dir: PathBuf,
    /// Per-symbol level files and the CSV report.
    pub output_dir: PathBuf,
    /// Short-code snapshots.
    pub tvcode_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("GEX_file"),
            output_dir: PathBuf::from("gamma_codes"),
            tvcode_dir: PathBuf::from("GEX_file").join("tvcode"),
        }
    }
}

impl PathsConfig {
    /// `<base_dir>/gamma_code`, home of the dated verbose output.
    pub fn gamma_code_dir(&self) -> PathBuf {
        self.base_dir.join("gamma_code")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub top_percentage: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_percentage: SelectionPolicy::default().top_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Append the reference levels after the gamma levels.
    pub use_level_with_gamma: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            use_level_with_gamma: SelectionPolicy::default().use_level_with_gamma,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub selection: SelectionConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let pct = self.selection.top_percentage;
        if !(pct > 0.0 && pct <= 100.0) {
            return Err(ConfigError::Invalid {
                field: "selection.top_percentage",
                reason: format!("{pct} is outside (0, 100]"),
            });
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "logging.level",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// The pipeline policy this configuration describes.
    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            top_percentage: self.selection.top_percentage,
            use_level_with_gamma: self.render.use_level_with_gamma,
        }
    }
}
