// src/backend/error.rs
use crate::models::common::Amount;
use candid::CandidType;
use serde::Deserialize;
use thiserror::Error;

#[derive(CandidType, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // --- Not found ---
    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // --- Authorization ---
    #[error("Caller is not the content creator")]
    NotCreator,

    #[error("Caller is not the session owner")]
    NotSessionOwner,

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    // --- Validation ---
    #[error("Invalid consumption amount")]
    InvalidConsumption,

    #[error("No consumption increase: current {current}, reported {reported}")]
    NoConsumptionIncrease { current: u128, reported: u128 },

    #[error("Rate below minimum: {rate} < {minimum}")]
    RateTooLow { rate: Amount, minimum: Amount },

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Amount below minimum: {amount} < {minimum}")]
    AmountBelowMinimum { amount: Amount, minimum: Amount },

    #[error("Update interval too low: {interval_secs}s < {minimum_secs}s")]
    UpdateIntervalTooLow { interval_secs: u64, minimum_secs: u64 },

    #[error("Limit exceeds maximum: {limit} > {maximum}")]
    LimitExceedsMaximum { limit: Amount, maximum: Amount },

    #[error("Invalid creator reference")]
    InvalidCreator,

    #[error("Invalid billing token reference")]
    InvalidToken,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Resource insufficiency ---
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Amount, requested: Amount },

    #[error("Monthly limit exceeded: limit {limit}, spent {spent}, requested {requested}")]
    MonthlyLimitExceeded { limit: Amount, spent: Amount, requested: Amount },

    #[error("No payment due")]
    NoPaymentDue,

    #[error("No pending earnings")]
    NoPendingEarnings,

    // --- State conflict ---
    #[error("Session not active")]
    SessionNotActive,

    #[error("Content is not active")]
    ContentInactive,

    #[error("Content already exists: {0}")]
    DuplicateContent(String),

    // --- Internal ---
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal canister error: {0}")]
    InternalError(String),
}

/// Coarse classification callers use to decide how to react to a failure.
#[derive(CandidType, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Authorization,
    Validation,
    ResourceInsufficiency,
    StateConflict,
    Internal,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        use LedgerError::*;
        match self {
            ContentNotFound(_) | SessionNotFound(_) => ErrorKind::NotFound,
            NotCreator | NotSessionOwner | NotAuthorized(_) => ErrorKind::Authorization,
            InvalidConsumption
            | NoConsumptionIncrease { .. }
            | RateTooLow { .. }
            | ZeroAmount
            | AmountBelowMinimum { .. }
            | UpdateIntervalTooLow { .. }
            | LimitExceedsMaximum { .. }
            | InvalidCreator
            | InvalidToken
            | InvalidInput(_) => ErrorKind::Validation,
            InsufficientBalance { .. } | MonthlyLimitExceeded { .. } | NoPaymentDue | NoPendingEarnings => {
                ErrorKind::ResourceInsufficiency
            }
            SessionNotActive | ContentInactive | DuplicateContent(_) => ErrorKind::StateConflict,
            StorageError(_) | InternalError(_) => ErrorKind::Internal,
        }
    }

    /// True when the caller can succeed later by acting outside the ledger
    /// (topping up, waiting for the next period, accruing consumption).
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ResourceInsufficiency
    }

    pub(crate) fn overflow(what: &str) -> Self {
        LedgerError::InternalError(format!("{} overflow", what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_covers_representative_variants() {
        assert_eq!(LedgerError::ContentNotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(LedgerError::NotSessionOwner.kind(), ErrorKind::Authorization);
        assert_eq!(
            LedgerError::NoConsumptionIncrease { current: 60, reported: 30 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(LedgerError::NoPendingEarnings.kind(), ErrorKind::ResourceInsufficiency);
        assert_eq!(LedgerError::DuplicateContent("x".into()).kind(), ErrorKind::StateConflict);
        assert_eq!(LedgerError::overflow("balance").kind(), ErrorKind::Internal);
    }

    #[test]
    fn only_resource_errors_are_retryable() {
        assert!(LedgerError::InsufficientBalance { available: 1, requested: 2 }.is_retryable());
        assert!(LedgerError::NoPaymentDue.is_retryable());
        assert!(!LedgerError::SessionNotActive.is_retryable());
        assert!(!LedgerError::NotCreator.is_retryable());
    }
}
