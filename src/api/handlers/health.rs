/*
 * Responsibility
 * - GET /        (welcome)
 * - GET /health  (liveness)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn index() -> impl IntoResponse {
    tracing::info!("root endpoint accessed");
    Json(json!({"message": "Welcome to the API!"}))
}

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "healthy", "message": "API is running"})),
    )
}
