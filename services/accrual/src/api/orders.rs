use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gophermart_core::error::StoreError;

use crate::models::{OrderRequest, OrderResponse};
use crate::AppState;

use super::error::ApiError;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OrderRequest>,
) -> Result<StatusCode, ApiError> {
    state.engine.submit(req).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.get_order_by_number(&number).await {
        Ok(order) => Ok(Json(OrderResponse {
            order: order.number,
            status: order.status,
            accrual: gophermart_core::money::NullUnit { unit: order.accrual, valid: true },
        })
        .into_response()),
        Err(StoreError::NotFound) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Err(e.into()),
    }
}
