use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use gophermart_core::error::StoreError;
use gophermart_core::luhn;

use crate::models::{Order, OrderResponse};
use crate::AppState;

use super::error::ApiError;
use super::middleware::AuthUser;

/// Body is the bare order number as `text/plain`, not JSON — a caller
/// sending the wrong content type gets a plain 400 rather than a parse
/// error about the wrong shape.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("text/plain") {
        return Err(ApiError::bad_request("expected text/plain body"));
    }

    let body = std::str::from_utf8(&body).map_err(|_| ApiError::bad_request("body is not UTF-8"))?;
    let number = body.trim();
    if !luhn::check(number) {
        return Err(ApiError::unprocessable());
    }

    match state.store.create_order(user_id, number).await {
        Ok(()) => {
            if let Ok(order) = state.store.get_order_by_number(number).await {
                state.processor.submit(order).await;
            }
            Ok(StatusCode::ACCEPTED)
        }
        Err(StoreError::Duplicate) => Ok(StatusCode::OK),
        Err(e) => Err(e.into()),
    }
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    match state.store.get_orders_by_user(user_id).await {
        Ok(orders) => {
            let body: Vec<OrderResponse> = orders.into_iter().map(Order::into).collect();
            Ok(Json(body).into_response())
        }
        Err(StoreError::NotFound) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Err(e.into()),
    }
}
