use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditDeskError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CreditDeskError {
    fn from(e: serde_json::Error) -> Self {
        CreditDeskError::SerializationError(e.to_string())
    }
}
