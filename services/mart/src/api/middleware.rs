//! Bearer-token auth, shared by every `/api/user` route except register and
//! login.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::AppState;

/// The user id resolved from a verified bearer token, inserted into
/// request extensions for handlers to pull out.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = token.ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .auth
        .identify(token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}
