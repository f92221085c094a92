use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskfrontError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Numeric error: {0}")]
    NumericError(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Clustering error: {0}")]
    ClusteringError(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RiskfrontError {
    fn from(e: serde_json::Error) -> Self {
        RiskfrontError::SerializationError(e.to_string())
    }
}
