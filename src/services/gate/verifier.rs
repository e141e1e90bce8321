use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use axum::http::HeaderValue;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};

use super::claims::TokenClaims;
use super::decision::{CapabilityLevel, Decision, DenyReason, VerifiedClaims};
use super::envelope;
use super::keys::KeyRing;

/// Algorithms a shared secret can verify. Anything else is refused outright.
pub fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// Verification rules that do not change while the process runs.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub allowed_algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            allowed_algorithms: vec![Algorithm::HS256],
            leeway_seconds: 0,
            issuer: None,
            audience: None,
        }
    }
}

/// Bearer-token verifier sitting in front of route handlers.
///
/// Stateless per call: every request is checked on its own against a
/// snapshot of the key ring.
#[derive(Debug, Clone)]
pub struct TokenGate {
    keys: Arc<KeyRing>,
    policy: GatePolicy,
}

impl TokenGate {
    pub fn new(keys: Arc<KeyRing>, policy: GatePolicy) -> Self {
        Self { keys, policy }
    }

    pub fn keys(&self) -> &Arc<KeyRing> {
        &self.keys
    }

    /// Decide from a raw `Authorization` header value.
    pub fn authorize_header(
        &self,
        header: Option<&HeaderValue>,
        level: CapabilityLevel,
    ) -> Decision {
        if level == CapabilityLevel::None {
            return Decision::Allow(VerifiedClaims::anonymous());
        }

        match bearer_token(header) {
            Ok(token) => self.authorize(token, level),
            Err(reason) => Decision::Deny(reason),
        }
    }

    pub fn authorize(&self, credential: Option<&str>, level: CapabilityLevel) -> Decision {
        self.authorize_at(credential, level, chrono::Utc::now().timestamp())
    }

    /// Same as [`authorize`](Self::authorize) with the clock supplied.
    pub fn authorize_at(
        &self,
        credential: Option<&str>,
        level: CapabilityLevel,
        now: i64,
    ) -> Decision {
        if level == CapabilityLevel::None {
            return Decision::Allow(VerifiedClaims::anonymous());
        }

        let Some(token) = credential.filter(|t| !t.is_empty()) else {
            return Decision::Deny(DenyReason::MissingCredential);
        };

        self.verify(token, level, now).into()
    }

    fn verify(
        &self,
        token: &str,
        level: CapabilityLevel,
        now: i64,
    ) -> Result<VerifiedClaims, DenyReason> {
        let envelope = envelope::parse(token)?;
        let alg = self.allowed_algorithm(&envelope.alg)?;

        let key = self.keys.current();
        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            key.decoding_key(),
            &self.validation(alg),
        )
        .map_err(|e| deny_reason(e.kind()))?;

        let claims = data.claims;
        if claims.is_expired(now, self.policy.leeway_seconds) {
            return Err(DenyReason::Expired);
        }

        let verified = claims.into_verified()?;
        if level == CapabilityLevel::Admin && !verified.is_admin() {
            return Err(DenyReason::InsufficientRole);
        }

        Ok(verified)
    }

    fn allowed_algorithm(&self, declared: &str) -> Result<Algorithm, DenyReason> {
        let alg = Algorithm::from_str(declared).map_err(|_| DenyReason::UnsupportedAlgorithm)?;
        if is_hmac(alg) && self.policy.allowed_algorithms.contains(&alg) {
            Ok(alg)
        } else {
            Err(DenyReason::UnsupportedAlgorithm)
        }
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        // Expiry is checked by the gate so the boundary and leeway are exact.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();
        // A configured issuer/audience also makes the claim mandatory.
        if let Some(iss) = &self.policy.issuer {
            validation.set_issuer(&[iss]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        match &self.policy.audience {
            Some(aud) => {
                validation.set_audience(&[aud]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }
        validation
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// `Ok(None)` means no credential at all.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<Option<&str>, DenyReason> {
    let Some(value) = header else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| DenyReason::MalformedToken)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .unwrap_or((value.trim(), ""));

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(DenyReason::MalformedToken);
    }

    let token = token.trim();
    if token.is_empty() {
        Ok(None)
    } else {
        Ok(Some(token))
    }
}

fn deny_reason(kind: &ErrorKind) -> DenyReason {
    match kind {
        ErrorKind::InvalidSignature => DenyReason::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            DenyReason::UnsupportedAlgorithm
        }
        ErrorKind::ExpiredSignature => DenyReason::Expired,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::MissingRequiredClaim(_) => DenyReason::InvalidClaims,
        _ => DenyReason::MalformedToken,
    }
}
