//! Error types for the ETL pipeline
//!
//! Each variant maps to one failure domain of a pipeline run. None of them
//! crosses the run boundary: the pipeline converts stage errors into logged
//! per-stage outcomes, and only `Config` aborts the process (at startup).

use thiserror::Error;

/// Result type alias for ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    /// Network or HTTP failure while pulling from the telemetry source.
    /// Recovered by degrading the run to a no-op load.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] reqwest::Error),

    /// Object store write failure (bucket check, creation, or put).
    #[error("Object store write failed: {0}")]
    StorageWrite(String),

    /// Relational load failure; the surrounding transaction is rolled back.
    #[error("Relational load failed: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Batch serialization failure.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or invalid required configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}
