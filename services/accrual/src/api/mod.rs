mod error;
mod goods;
mod orders;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/orders", post(orders::register))
        .route("/api/orders/:number", get(orders::get))
        .route("/api/goods", post(goods::create_match))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
