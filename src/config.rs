/*
 * Responsibility
 * - Read settings from the environment (.env is loaded first)
 * - Validate them; anything missing or unusable aborts startup
 * - The signing secret never has a default: running without one would
 *   mean accepting tokens nobody can vouch for
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::services::gate::keys::MIN_SECRET_BYTES;
use crate::services::gate::verifier::is_hmac;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub token_signing_secret: String,
    // When set, SIGHUP re-reads the secret from here
    pub token_signing_secret_file: Option<PathBuf>,
    pub token_allowed_algorithms: Vec<Algorithm>,
    pub token_leeway_seconds: u64,
    pub token_issuer: Option<String>,
    pub token_audience: Option<String>,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("token_signing_secret_file", &self.token_signing_secret_file)
            .field("token_allowed_algorithms", &self.token_allowed_algorithms)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .field("token_issuer", &self.token_issuer)
            .field("token_audience", &self.token_audience)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. `from_env` passes the process env.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let token_signing_secret_file = get("TOKEN_SIGNING_SECRET_FILE").map(PathBuf::from);
        let token_signing_secret = match (&token_signing_secret_file, get("TOKEN_SIGNING_SECRET"))
        {
            (Some(path), _) => read_secret_file(path)?,
            (None, Some(secret)) => secret,
            (None, None) => return Err(ConfigError::Missing("TOKEN_SIGNING_SECRET")),
        };
        validate_secret(&token_signing_secret)?;

        let token_allowed_algorithms =
            parse_algorithms(&get("TOKEN_ALLOWED_ALGORITHMS").unwrap_or_else(|| "HS256".into()))?;

        let token_leeway_seconds =
            parse_or("TOKEN_LEEWAY_SECONDS", get("TOKEN_LEEWAY_SECONDS"), 0)?;

        let token_issuer = get("TOKEN_ISSUER").filter(|s| !s.trim().is_empty());
        let token_audience = get("TOKEN_AUDIENCE").filter(|s| !s.trim().is_empty());

        let request_timeout_seconds =
            parse_or("REQUEST_TIMEOUT_SECONDS", get("REQUEST_TIMEOUT_SECONDS"), 30)?;
        let request_body_limit_bytes =
            parse_or("REQUEST_BODY_LIMIT_BYTES", get("REQUEST_BODY_LIMIT_BYTES"), 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            token_signing_secret,
            token_signing_secret_file,
            token_allowed_algorithms,
            token_leeway_seconds,
            token_issuer,
            token_audience,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

/// Read a secret file, dropping the trailing newline editors like to add.
pub fn read_secret_file(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|_| ConfigError::Invalid("TOKEN_SIGNING_SECRET_FILE"))?;
    Ok(trim_secret(&raw))
}

pub fn trim_secret(raw: &str) -> String {
    raw.trim_end_matches(['\r', '\n']).to_string()
}

fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::Invalid("TOKEN_SIGNING_SECRET"));
    }
    Ok(())
}

fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algs = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Algorithm::from_str(s)
                .ok()
                .filter(|alg| is_hmac(*alg))
                .ok_or(ConfigError::Invalid("TOKEN_ALLOWED_ALGORITHMS"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algs.is_empty() {
        return Err(ConfigError::Invalid("TOKEN_ALLOWED_ALGORITHMS"));
    }
    Ok(algs)
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
