//! Logging configuration and initialization.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Filter directive: `debug` when forced, the configured level otherwise.
    pub fn directive(&self, debug: bool) -> &str {
        if debug {
            "debug"
        } else {
            &self.level
        }
    }

    /// Initialize the tracing subscriber on stderr. `RUST_LOG` overrides the level.
    ///
    /// Safe to call more than once; later calls leave the first subscriber
    /// in place.
    pub fn init(&self, debug: bool) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directive(debug)));

        let _ = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_overrides_level() {
        let config = LoggingConfig {
            level: "warn".into(),
            format: "pretty".into(),
        };
        assert_eq!(config.directive(false), "warn");
        assert_eq!(config.directive(true), "debug");
    }

    #[test]
    fn init_twice_does_not_panic() {
        let config = LoggingConfig::default();
        config.init(false);
        config.init(true);
    }
}
