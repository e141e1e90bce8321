/*
 * Responsibility
 * - AppError shared by handlers and middleware
 * - IntoResponse: HTTP status + `{"error": "<Reason>"}`
 * - Gate denials map to 401/403
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::gate::DenyReason;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("request denied: {0}")]
    Denied(#[from] DenyReason),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Denied(reason) = self;
        let (status, error) = (reason.status(), reason.as_str());

        let mut res = (status, Json(ErrorResponse { error })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_carries_challenge() {
        let res = AppError::Denied(DenyReason::Expired).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn forbidden_has_no_challenge() {
        let res = AppError::Denied(DenyReason::InsufficientRole).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(res.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn body_names_the_reason() {
        let res = AppError::from(DenyReason::InvalidClaims).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    }
}
