pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::workflow::handlers;

/// Resumes are small; anything past this is rejected before the handler runs.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/workflow/run", post(handlers::handle_run))
        .route("/api/v1/workflow/latest", get(handlers::handle_latest))
        .route("/api/v1/interview-prep", post(handlers::handle_interview_prep))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
