/*
 * Responsibility
 * - GET  /public     (no credential)
 * - GET  /protected  (any verified token)
 * - POST /admin      (verified token with the admin role)
 * - The gate has already decided; handlers only read the claims
 */
use axum::Json;
use serde::Serialize;

use crate::api::extractors::Verified;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

pub async fn public() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "This is a public endpoint.",
        subject: None,
    })
}

pub async fn protected(Verified(claims): Verified) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "This is a protected endpoint.",
        subject: claims.subject,
    })
}

pub async fn admin(Verified(claims): Verified) -> Json<MessageResponse> {
    tracing::info!(subject = ?claims.subject, "admin action performed");
    Json(MessageResponse {
        message: "Admin action successful!",
        subject: claims.subject,
    })
}
