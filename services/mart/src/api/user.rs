use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::CredentialsRequest;
use crate::AppState;

use super::error::ApiError;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let token = state.auth.sign_up(&req.login, &req.password).await?;
    Ok(with_bearer(StatusCode::OK, &token))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let token = state.auth.sign_in(&req.login, &req.password).await?;
    Ok(with_bearer(StatusCode::OK, &token))
}

fn with_bearer(status: StatusCode, token: &str) -> Response {
    let mut res = status.into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
        res.headers_mut().insert(header::AUTHORIZATION, value);
    }
    res
}
