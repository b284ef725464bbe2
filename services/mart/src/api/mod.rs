mod balance;
mod error;
mod middleware;
mod orders;
mod user;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/user/orders", post(orders::submit).get(orders::list))
        .route("/api/user/balance", get(balance::get))
        .route("/api/user/balance/withdraw", post(balance::withdraw))
        .route("/api/user/withdrawals", get(balance::withdrawals))
        .route_layer(from_fn_with_state(Arc::clone(&state), middleware::require_auth));

    let public = Router::new()
        .route("/api/user/register", post(user::register))
        .route("/api/user/login", post(user::login));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
