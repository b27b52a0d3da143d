//! Result and error types for the core library

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every variant is recoverable: the shell reports it as a single message
/// and the persisted state is left as it was before the failed action.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid amount: {0} (must be greater than zero)")]
    InvalidAmount(Decimal),

    #[error("Amount too large: {0} would overflow the balance")]
    AmountTooLarge(Decimal),

    #[error("Total out of range: {0}")]
    Overflow(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Decimal, available: Decimal },

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("ID number already registered: {0}")]
    DuplicateIdNumber(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("Cannot transfer money to yourself")]
    SelfTransferRejected,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for failures caused by the user's input rather than the environment
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Error::Storage(_) | Error::Io(_) | Error::Json(_))
    }

    /// Stable name of the variant, safe to log (carries no amounts or names)
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidAmount(_) => "invalid_amount",
            Error::AmountTooLarge(_) => "amount_too_large",
            Error::Overflow(_) => "overflow",
            Error::InsufficientFunds { .. } => "insufficient_funds",
            Error::DuplicateUsername(_) => "duplicate_username",
            Error::DuplicateIdNumber(_) => "duplicate_id_number",
            Error::UserNotFound(_) => "user_not_found",
            Error::RecipientNotFound(_) => "recipient_not_found",
            Error::AuthenticationFailed => "authentication_failed",
            Error::SelfTransferRejected => "self_transfer_rejected",
            Error::NotLoggedIn => "not_logged_in",
            Error::SessionExpired => "session_expired",
            Error::Validation(_) => "validation",
            Error::Storage(_) => "storage",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
