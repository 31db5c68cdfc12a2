use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the roster crates.
#[derive(Error, Debug)]
pub enum RosterError {
    /// No worksheet title matched the target month, exactly or by prefix.
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// A month specifier did not parse as `YYYY-MM`.
    #[error("Invalid month format (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    /// A day specifier did not parse as `YYYY-MM-DD`.
    #[error("Invalid date format (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The workbook source path does not exist.
    #[error("Workbook source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the roster crates.
pub type Result<T> = std::result::Result<T, RosterError>;
