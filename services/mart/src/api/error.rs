use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gophermart_core::error::StoreError;
use serde::Serialize;

use crate::auth::AuthError;
use crate::operations::OperationsError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: Some(message.into()) }
    }

    fn bare(status: StatusCode) -> Self {
        Self { status, message: None }
    }

    pub fn unprocessable() -> Self {
        Self::bare(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.message {
            Some(message) => {
                (self.status, Json(ErrorBody { message: &message })).into_response()
            }
            None => self.status.into_response(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => ApiError::bare(StatusCode::CONFLICT),
            StoreError::DuplicateOtherUser => ApiError::bare(StatusCode::CONFLICT),
            StoreError::NotFound => ApiError::bare(StatusCode::NO_CONTENT),
            StoreError::BalanceBelowZero => ApiError::bare(StatusCode::PAYMENT_REQUIRED),
            StoreError::InvalidPassword => ApiError::bare(StatusCode::UNAUTHORIZED),
            StoreError::Other(e) => {
                tracing::error!(error = %e, "unclassified store error");
                ApiError::bare(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmptyLogin | AuthError::InvalidPassword => {
                ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            AuthError::Store(StoreError::Duplicate) => ApiError::bare(StatusCode::CONFLICT),
            AuthError::Store(StoreError::NotFound) => ApiError::bare(StatusCode::UNAUTHORIZED),
            AuthError::Store(e) => e.into(),
            AuthError::Hash(e) => {
                tracing::error!(error = %e, "bcrypt failure");
                ApiError::bare(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AuthError::Sign(e) => {
                tracing::error!(error = %e, "token signing failure");
                ApiError::bare(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl From<OperationsError> for ApiError {
    fn from(err: OperationsError) -> Self {
        match err {
            OperationsError::InvalidNumber => ApiError::bare(StatusCode::UNPROCESSABLE_ENTITY),
            OperationsError::Store(e) => e.into(),
        }
    }
}
