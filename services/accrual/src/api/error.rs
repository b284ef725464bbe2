use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gophermart_core::error::StoreError;
use serde::Serialize;

use crate::engine::EngineError;

/// Maps a failure at the HTTP boundary to a status code and an optional
/// `{"message": ...}` body. Bodies are omitted where the wire contract only
/// specifies a status (e.g. 204, 409).
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

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidNumber | EngineError::EmptyGoods => {
                ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            EngineError::Duplicate => ApiError::bare(StatusCode::CONFLICT),
            EngineError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate | StoreError::DuplicateOtherUser => {
                ApiError::bare(StatusCode::CONFLICT)
            }
            StoreError::NotFound => ApiError::bare(StatusCode::NOT_FOUND),
            StoreError::BalanceBelowZero => ApiError::bare(StatusCode::PAYMENT_REQUIRED),
            StoreError::InvalidPassword => ApiError::bare(StatusCode::UNAUTHORIZED),
            StoreError::Other(e) => {
                tracing::error!(error = %e, "unclassified store error");
                ApiError::bare(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
