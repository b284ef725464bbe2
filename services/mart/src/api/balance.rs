use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use crate::models::{BalanceResponse, OperationResponse, WithdrawRequest};
use crate::AppState;

use super::error::ApiError;
use super::middleware::AuthUser;

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.store.get_balance(user_id).await?;
    Ok(Json(balance.into()))
}

pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<WithdrawRequest>,
) -> Result<StatusCode, ApiError> {
    state.operations.perform(user_id, &req.order, req.sum).await?;
    Ok(StatusCode::OK)
}

pub async fn withdrawals(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    match state.operations.get_operations(user_id).await {
        Ok(ops) => {
            let body: Vec<OperationResponse> = ops.into_iter().map(Into::into).collect();
            Ok(Json(body).into_response())
        }
        Err(crate::operations::OperationsError::Store(gophermart_core::error::StoreError::NotFound)) => {
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
