use std::io;
use thiserror::Error;

/// Custom error type for CoreFreq
#[derive(Error, Debug)]
pub enum CoreFreqError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sensor provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Data logger error: {0}")]
    Logger(String),

    #[error("TUI error: {0}")]
    Tui(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CoreFreq
pub type Result<T> = std::result::Result<T, CoreFreqError>;

impl CoreFreqError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CoreFreqError::Config(msg.into())
    }

    /// Create a provider-unavailable error.
    ///
    /// The message is shown to the operator as-is, so it should say what to fix.
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        CoreFreqError::ProviderUnavailable(msg.into())
    }

    pub fn fixture<S: Into<String>>(msg: S) -> Self {
        CoreFreqError::Fixture(msg.into())
    }

    pub fn logger<S: Into<String>>(msg: S) -> Self {
        CoreFreqError::Logger(msg.into())
    }

    pub fn tui<S: Into<String>>(msg: S) -> Self {
        CoreFreqError::Tui(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CoreFreqError::Other(msg.into())
    }

    /// True for the one failure class that must stop the process at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreFreqError::ProviderUnavailable(_))
    }
}
