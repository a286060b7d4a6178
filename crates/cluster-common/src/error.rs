//! Error types for the cluster map crates.

use thiserror::Error;

/// Result type alias using ClusterError.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Primary error type for loading, projecting and rendering map data.
#[derive(Debug, Error)]
pub enum ClusterError {
    // === Input Errors ===
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Failed to parse CSV: {0}")]
    CsvError(String),

    #[error("Invalid geometry: {0}")]
    GeometryError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    IoError(String),
}

// Conversion from common error types
impl From<std::io::Error> for ClusterError {
    fn from(err: std::io::Error) -> Self {
        ClusterError::IoError(err.to_string())
    }
}

impl From<csv::Error> for ClusterError {
    fn from(err: csv::Error) -> Self {
        ClusterError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ClusterError {
    fn from(err: serde_json::Error) -> Self {
        ClusterError::GeometryError(format!("JSON error: {}", err))
    }
}
