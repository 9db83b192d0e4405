//! gexcode runner — batch extraction, level conversion, reports.
//!
//! This crate builds on `gexcode-core` to provide:
//! - TOML configuration with per-section defaults
//! - Logging setup from the `[logging]` section
//! - Batch extraction over `<base>/<SYMBOL>/html/Gamma_<SYMBOL>_<YYYYMMDD>.html`
//! - The dated verbose output file and the CSV extraction report
//! - Validated long ↔ short conversion of level files

pub mod batch;
pub mod config;
pub mod convert;
pub mod logging;
pub mod report;

pub use batch::{run_batch, BatchOptions, BatchSummary, DocumentOutcome, SymbolDocument};
pub use config::{Config, ConfigError, PathsConfig, RenderConfig, SelectionConfig};
pub use convert::{convert_file, ConvertError, ConvertOptions, ConvertOutcome};
pub use logging::LoggingConfig;
pub use report::{export_report_csv, ReportRow};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn batch_values_are_send_sync() {
        assert_send::<SymbolDocument>();
        assert_sync::<SymbolDocument>();
        assert_send::<DocumentOutcome>();
        assert_sync::<DocumentOutcome>();
        assert_send::<Config>();
        assert_sync::<Config>();
    }
}
