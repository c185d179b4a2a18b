use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LendError {
    #[error("Invalid loan terms: {field}: {reason}")]
    InvalidLoanTerms { field: String, reason: String },

    #[error("Invalid credit score {score}: must be between {min} and {max}")]
    InvalidScore { score: i32, min: i32, max: i32 },

    #[error("Invalid transition: cannot {event} a loan that is {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Overpayment: payment of {amount} exceeds outstanding balance of {outstanding}")]
    Overpayment { amount: Decimal, outstanding: Decimal },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LendError {
    /// Only persistence faults are transient; everything else is bad caller data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LendError::Persistence(_))
    }
}

impl From<serde_json::Error> for LendError {
    fn from(e: serde_json::Error) -> Self {
        LendError::SerializationError(e.to_string())
    }
}
