use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeasingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No rate bracket covers the amount {amount}")]
    NoMatchingRange { amount: Decimal },

    #[error("Zero coefficient in {context}")]
    ZeroCoefficient { context: String },

    #[error("Empty rate table: {0}")]
    EmptyRateTable(String),

    #[error("Invalid status transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LeasingError {
    fn from(e: serde_json::Error) -> Self {
        LeasingError::SerializationError(e.to_string())
    }
}
