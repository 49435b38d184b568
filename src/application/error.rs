use thiserror::Error;

use crate::domain::LedgerError;
use crate::transport::TransportError;

/// Reasons a batch cannot be submitted. Checked before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Sender name is required")]
    MissingSender,

    #[error("Seal number is required")]
    MissingSealNumber,

    #[error("At least one complete row (number, amount and payment method) is required")]
    NoCompleteRow,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid form: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AppError {
    pub fn is_capacity(&self) -> bool {
        matches!(self, AppError::Ledger(err) if err.is_capacity())
    }
}
