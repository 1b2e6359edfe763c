use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the cohort dashboard.
#[derive(Error, Debug)]
pub enum DashError {
    /// The source CSV could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be decoded at the CSV framing level.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A cell failed numeric coercion under the strict parse policy.
    #[error("Cannot coerce {column} value \"{value}\" to a number")]
    CellParse { column: String, value: String },

    /// No cohort CSV was found at any of the candidate locations.
    #[error("Data file not found: {0}")]
    DataPathNotFound(PathBuf),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashError>;
