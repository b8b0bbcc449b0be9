pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

// CV uploads: the axum default of 2 MB is too small for scanned PDFs.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/models", get(handlers::handle_list_models))
        .route("/api/v1/letters/generate", post(handlers::handle_generate))
        .route("/api/v1/letters/undo", post(handlers::handle_undo))
        .route("/api/v1/letters/redo", post(handlers::handle_redo))
        .route("/api/v1/letters/preview", post(handlers::handle_preview))
        .route(
            "/api/v1/letters/transcript/reset",
            post(handlers::handle_reset_transcript),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
