use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Error type covering the different failure cases that can occur while the
/// report inputs are loaded, reconciled, or persisted.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Raised when an input file cannot be opened or read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when a report file cannot be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wrapper for IO failures that are not tied to a single path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when CSV parsing or serialization fails.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a required column is absent from a tabular input.
    #[error("missing required column '{column}' in {}", source_path.display())]
    MissingColumn { column: String, source_path: PathBuf },

    /// Raised when a numeric cell cannot be parsed.
    #[error("invalid value '{value}' in column {column}")]
    InvalidValue { column: String, value: String },

    /// Raised when a simulation record does not carry one value per variable.
    #[error("simulation record has {found} values but the table declares {expected} variables")]
    RecordWidth { expected: usize, found: usize },

    /// Raised when a workbook has no worksheet to read the simulation from.
    #[error("workbook {0} contains no worksheets")]
    EmptyWorkbook(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when neither the CLI nor the config file provides a setting.
    #[error("missing setting '{0}' (pass it as a flag or in the config file)")]
    MissingSetting(&'static str),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
