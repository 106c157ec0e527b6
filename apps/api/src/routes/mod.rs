pub mod health;
pub mod index;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::bibliography::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        .route("/upload", post(handlers::handle_upload))
        .route(
            "/api/v1/bibliography/preview",
            post(handlers::handle_preview),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
