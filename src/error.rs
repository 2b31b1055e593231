//! Error types for psylog

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort extraction of a single log file
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Input path does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Could not extract experiment datetime from filename: {0}")]
    MetadataFormat(String),

    #[error("No trials parsed")]
    EmptyOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
