use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Liveness greeting for browsers and uptime checks.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Resume Tailoring System API!"
    }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api"
    }))
}
