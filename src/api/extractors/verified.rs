use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::gate::{DenyReason, VerifiedClaims};

/// Handler-side view of the claims the gate verified.
///
/// The gate middleware must have run on the route; without it the request
/// is treated as carrying no credential.
#[derive(Debug, Clone)]
pub struct Verified(pub VerifiedClaims);

impl<S> FromRequestParts<S> for Verified
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedClaims>()
            .cloned()
            .map(Verified)
            .ok_or(AppError::Denied(DenyReason::MissingCredential))
    }
}
