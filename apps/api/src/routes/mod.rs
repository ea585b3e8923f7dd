pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::handlers as storage;

async fn not_implemented() -> Result<(), AppError> {
    Err(AppError::NotImplemented)
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/analyze/", post(analysis::handle_analyze))
        .route("/analyze/tailor/", post(analysis::handle_analyze))
        .route("/analyze/ats/", post(not_implemented))
        // Storage API
        .route("/s3/presign", get(storage::handle_presign))
        .route("/s3/resumes", get(storage::handle_list_resumes))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
