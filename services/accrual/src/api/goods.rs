use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{CreateMatchRequest, RewardKind};
use crate::AppState;

use super::error::ApiError;

pub async fn create_match(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<StatusCode, ApiError> {
    if req.name.is_empty() {
        return Err(ApiError::bad_request("missing match name"));
    }

    let kind: RewardKind = req.reward_type.into();
    let reward = req.reward_column();

    state
        .store
        .create_match(&req.name, kind, reward)
        .await?;

    Ok(StatusCode::OK)
}
