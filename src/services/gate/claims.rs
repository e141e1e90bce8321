use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::decision::{DenyReason, VerifiedClaims};

/// Token claims as they appear on the wire.
///
/// NOTE:
/// - `user` is accepted as the subject when `sub` is absent; older tokens
///   were minted with that name.
/// - `aud` is validated by `jsonwebtoken` when an audience is configured and
///   is not carried further.
/// - `exp` is a NumericDate and may carry a fraction; it is floored to whole
///   seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl TokenClaims {
    pub fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .or(self.user.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// `exp` in whole seconds. Float to int `as` saturates.
    pub fn expires_at(&self) -> Option<i64> {
        self.exp.map(|exp| exp.floor() as i64)
    }

    /// `exp + leeway <= now` counts as expired. A token without `exp` never
    /// expires here.
    pub fn is_expired(&self, now: i64, leeway_seconds: u64) -> bool {
        let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);
        match self.expires_at() {
            Some(exp) => exp.saturating_add(leeway) <= now,
            None => false,
        }
    }

    pub fn into_verified(self) -> Result<VerifiedClaims, DenyReason> {
        let subject = self
            .subject()
            .map(str::to_string)
            .ok_or(DenyReason::MalformedToken)?;

        let expiry = match self.expires_at() {
            Some(exp) => {
                Some(DateTime::<Utc>::from_timestamp(exp, 0).ok_or(DenyReason::MalformedToken)?)
            }
            None => None,
        };

        Ok(VerifiedClaims {
            issuer: self.iss,
            subject: Some(subject),
            roles: self.roles.into_iter().collect::<BTreeSet<_>>(),
            expiry,
        })
    }
}
