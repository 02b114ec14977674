//! Error types for the emissions experiments

use thiserror::Error;

/// Result type alias for emissions-ml operations
pub type Result<T> = std::result::Result<T, EmissionsError>;

/// Main error type for the emissions experiments
#[derive(Error, Debug)]
pub enum EmissionsError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for EmissionsError {
    fn from(err: polars::error::PolarsError) -> Self {
        EmissionsError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for EmissionsError {
    fn from(err: serde_json::Error) -> Self {
        EmissionsError::SerializationError(err.to_string())
    }
}
