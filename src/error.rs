//! Error types for the readmission risk pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ReadmitError>;

/// Main error type for the readmission risk crate
#[derive(Error, Debug)]
pub enum ReadmitError {
    #[error("Data error: {0}")]
    DataError(String),

    /// A request field could not be interpreted, even after coercion
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Produced columns disagree with the frozen feature schema
    #[error("Schema mismatch: missing columns {missing:?}, unexpected columns {extra:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    /// Same columns as the schema, in a different order
    #[error("Column order differs from schema at position {position}: expected {expected:?}, found {found:?}")]
    ColumnOrderMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Training error: {0}")]
    TrainingError(String),

    /// The model artifact is missing, corrupt or internally inconsistent
    #[error("Startup error: {0}")]
    StartupError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("{0} is already fitted; fitted state is frozen")]
    AlreadyFitted(&'static str),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl ReadmitError {
    /// Whether the error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, ReadmitError::InputError(_))
    }
}

impl From<polars::prelude::PolarsError> for ReadmitError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ReadmitError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ReadmitError {
    fn from(err: serde_json::Error) -> Self {
        ReadmitError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ReadmitError {
    fn from(err: ndarray::ShapeError) -> Self {
        ReadmitError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
