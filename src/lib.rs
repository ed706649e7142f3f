// CoreFreq Library - Public API

// Re-export error types
pub mod error;
pub use error::{CoreFreqError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::Settings;
pub use core::telemetry::{AggregationService, Snapshot};

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

/// Expand the `{Date}` placeholder of a log file template to `YYYY-MM-DD`.
pub fn log_file_path(template: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    PathBuf::from(template.replace("{Date}", &date))
}

/// Initialize logging.
///
/// `RUST_LOG` still overrides `level`. With `file` set, records are appended to that
/// template's file instead of stderr.
pub fn init_logging(level: log::LevelFilter, file: Option<&str>) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if let Some(template) = file {
        let path = log_file_path(template);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let target = OpenOptions::new().create(true).append(true).open(&path)?;
        builder.target(env_logger::Target::Pipe(Box::new(target)));
    }

    builder
        .try_init()
        .map_err(|e| CoreFreqError::other(format!("logger already initialized: {}", e)))
}
