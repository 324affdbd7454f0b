//! Error types for Rehab Flux

use thiserror::Error;

/// Errors that can occur while configuring sources, fetching tables, or exporting reports
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source table is empty: {0}")]
    EmptySource(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
