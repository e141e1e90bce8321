//! Capability levels and the per-request authorization outcome.

use std::collections::BTreeSet;
use std::fmt;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Minimum trust tier a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityLevel {
    None,
    Authenticated,
    Admin,
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Authenticated => "authenticated",
            Self::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// Why the gate refused a request.
///
/// Every variant is an expected outcome. The HTTP layer turns it into a
/// status code and `{"error": "<Reason>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum DenyReason {
    #[error("no bearer credential was presented")]
    MissingCredential,
    #[error("credential is not a well-formed signed token")]
    MalformedToken,
    #[error("token algorithm is not allowed")]
    UnsupportedAlgorithm,
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token lacks the required role")]
    InsufficientRole,
    #[error("token issuer or audience does not match")]
    InvalidClaims,
}

impl DenyReason {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InsufficientRole => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "MissingCredential",
            Self::MalformedToken => "MalformedToken",
            Self::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            Self::InvalidSignature => "InvalidSignature",
            Self::Expired => "Expired",
            Self::InsufficientRole => "InsufficientRole",
            Self::InvalidClaims => "InvalidClaims",
        }
    }
}

/// Claims the gate has verified and downstream handlers may trust.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub issuer: Option<String>,
    pub subject: Option<String>,
    pub roles: BTreeSet<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl VerifiedClaims {
    /// Claims attached to requests on routes that need no credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

pub const ADMIN_ROLE: &str = "admin";

/// Outcome of one gate evaluation. Computed fresh per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(VerifiedClaims),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

impl From<Result<VerifiedClaims, DenyReason>> for Decision {
    fn from(r: Result<VerifiedClaims, DenyReason>) -> Self {
        match r {
            Ok(claims) => Self::Allow(claims),
            Err(reason) => Self::Deny(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_insufficient_role_is_forbidden() {
        let all = [
            DenyReason::MissingCredential,
            DenyReason::MalformedToken,
            DenyReason::UnsupportedAlgorithm,
            DenyReason::InvalidSignature,
            DenyReason::Expired,
            DenyReason::InvalidClaims,
        ];
        for reason in all {
            assert_eq!(reason.status(), StatusCode::UNAUTHORIZED, "{reason:?}");
        }
        assert_eq!(
            DenyReason::InsufficientRole.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn reason_serializes_as_variant_name() {
        let json = serde_json::to_string(&DenyReason::InvalidSignature).unwrap();
        assert_eq!(json, "\"InvalidSignature\"");
        assert_eq!(DenyReason::Expired.as_str(), "Expired");
    }

    #[test]
    fn anonymous_claims_have_no_roles() {
        let claims = VerifiedClaims::anonymous();
        assert!(claims.subject.is_none());
        assert!(!claims.is_admin());
    }
}
