//! Signs bearer tokens for the API with the shared HMAC secret.
//!
//! The API and this crate share configuration (the secret, the algorithm,
//! the issuer name), never code.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MIN_SECRET_BYTES: usize = 32;
pub const DEFAULT_ISSUER: &str = "backend-api";
pub const DEFAULT_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("signing secret must be at least {MIN_SECRET_BYTES} bytes (got {0})")]
    WeakSecret(usize),
    #[error("algorithm {0} cannot be used with a shared secret")]
    UnsupportedAlgorithm(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// Claims written into every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedClaims {
    pub iss: String,
    pub sub: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub subject: String,
    pub roles: Vec<String>,
    pub ttl_seconds: u64,
}

impl IssueRequest {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            roles: Vec::new(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

pub fn parse_algorithm(name: &str) -> Result<Algorithm, IssueError> {
    Algorithm::from_str(name.trim())
        .ok()
        .filter(|alg| is_hmac(*alg))
        .ok_or_else(|| IssueError::UnsupportedAlgorithm(name.to_string()))
}

/// Read a secret file, dropping the trailing newline.
pub fn read_secret_file(path: &Path) -> Result<String, IssueError> {
    let raw = std::fs::read_to_string(path).map_err(|source| IssueError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw.trim_end_matches(['\r', '\n']).to_string())
}

#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: Algorithm,
    issuer: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(
        secret: &[u8],
        algorithm: Algorithm,
        issuer: impl Into<String>,
    ) -> Result<Self, IssueError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(IssueError::WeakSecret(secret.len()));
        }
        if !is_hmac(algorithm) {
            return Err(IssueError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }

        Ok(Self {
            algorithm,
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret),
        })
    }

    pub fn issue(&self, req: &IssueRequest) -> Result<String, IssueError> {
        self.issue_at(req, chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, req: &IssueRequest, now: i64) -> Result<String, IssueError> {
        let claims = self.claims_at(req, now)?;
        self.sign(&claims)
    }

    pub fn claims_at(&self, req: &IssueRequest, now: i64) -> Result<IssuedClaims, IssueError> {
        let subject = req.subject.trim();
        if subject.is_empty() {
            return Err(IssueError::Missing("subject"));
        }

        Ok(IssuedClaims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            roles: req.roles.clone(),
            iat: now,
            exp: now.saturating_add(i64::try_from(req.ttl_seconds).unwrap_or(i64::MAX)),
            jti: Uuid::new_v4().to_string(),
        })
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, IssueError> {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, claims, &self.encoding_key)?)
    }
}
