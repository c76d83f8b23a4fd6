//! Validation errors raised when building ledger records.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("{field} must be a day of month between 1 and 31, got {day}")]
    DayOutOfRange { field: &'static str, day: i32 },

    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("unknown transaction type: {0}")]
    UnknownKind(String),

    #[error("only payable debts can be credit cards")]
    ReceivableCard,
}
