use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/get-formats", post(handlers::get_formats))
        .route("/download", post(handlers::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
