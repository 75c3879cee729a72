//! FILENAME: analytics-engine/src/error.rs

use thiserror::Error;

/// Failures loading an `AnalyticsConfig`. The pipeline itself never fails.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
