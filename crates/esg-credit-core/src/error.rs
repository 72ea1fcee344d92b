use thiserror::Error;

#[derive(Debug, Error)]
pub enum EsgCreditError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unknown scenario '{name}'. Valid scenarios: {}", .valid.join(", "))]
    UnknownScenario { name: String, valid: Vec<String> },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Model not fitted: {0}")]
    ModelNotFitted(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for EsgCreditError {
    fn from(e: serde_json::Error) -> Self {
        EsgCreditError::SerializationError(e.to_string())
    }
}
