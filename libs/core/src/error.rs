//! Shared error taxonomy classifying failures the way the Store and the
//! Accrual Client boundaries do, so upper layers branch on kind rather than
//! driver-specific error types.

use std::time::Duration;

/// Errors surfaced by a Store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value")]
    Duplicate,

    #[error("duplicate value from another user")]
    DuplicateOtherUser,

    #[error("value not found")]
    NotFound,

    #[error("balance can't be below zero")]
    BalanceBelowZero,

    #[error("invalid password")]
    InvalidPassword,

    #[error(transparent)]
    Other(#[from] sqlx::Error),
}

/// The Postgres integrity-constraint-violation error class (`23*`).
const INTEGRITY_CONSTRAINT_VIOLATION_CLASS: &str = "23";

/// Classifies a raw `sqlx::Error` into a [`StoreError`].
///
/// `DuplicateOtherUser` is never produced here — it can only be
/// distinguished by an in-transaction ownership check, never by catching a
/// constraint violation (see `Store::create_order`).
pub fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                if code.starts_with(INTEGRITY_CONSTRAINT_VIOLATION_CLASS) {
                    return StoreError::Duplicate;
                }
            }
            StoreError::Other(err)
        }
        _ => StoreError::Other(err),
    }
}

/// Errors surfaced by the Accrual Client.
#[derive(Debug, thiserror::Error)]
pub enum AccrualClientError {
    #[error("order is not registered")]
    OrderNotRegistered,

    #[error("internal server error")]
    InternalServerError,

    #[error("resource exhausted: {message}")]
    ResourceExhausted { retry_after: Duration, message: String },

    #[error("request cancelled")]
    Canceled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors surfaced by the token Signer.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("token is expired")]
    TokenExpired,

    #[error(transparent)]
    Other(#[from] jsonwebtoken::errors::Error),
}
