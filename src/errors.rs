use thiserror::Error;
use uuid::Uuid;

use crate::schedule::validation::ValidationError;

/// Unified error type for the domain, schedule, and storage layers.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Budget plan not found: {0}")]
    PlanNotFound(String),
    #[error("Installment not found: {0}")]
    InstallmentNotFound(String),
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;

impl From<std::io::Error> for PlanError {
    fn from(err: std::io::Error) -> Self {
        PlanError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Storage(err.to_string())
    }
}
