pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/analyze-resume",
            post(handlers::handle_analyze_resume),
        )
        .route(
            "/api/v1/extract-skills",
            post(handlers::handle_extract_skills),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
