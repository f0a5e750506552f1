//! Error types for the CalcVault engine.

use crate::RecordId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a calculation failed.
///
/// Every kind ends in the same visible behaviour (the display shows
/// `"Error"` until the reset fires); the kind is carried on the
/// [`Event::Failed`](crate::Event::Failed) event so callers can tell them apart.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    InvalidResult,

    #[error("invalid input")]
    InvalidInput,
}

/// All possible errors from the record stores and persistence layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("please fill in both {0}")]
    EmptyField(&'static str),

    // Vault errors
    #[error("Incorrect password. Access denied.")]
    IncorrectPassword,

    #[error("new password cannot be empty")]
    EmptyPassword,

    #[error("new passwords do not match")]
    PasswordMismatch,

    #[error("vault is locked")]
    VaultLocked,

    #[error("file {name} is too large (max {limit})")]
    FileTooLarge { name: String, limit: String },

    #[error("blob not found: {0}")]
    BlobNotFound(RecordId),

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
