/// Factory: build `TokenGate` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::services::gate::{GatePolicy, KeyRing, SigningKey, TokenGate};

pub fn build_token_gate(config: &Config) -> Result<Arc<TokenGate>, ConfigError> {
    let key = SigningKey::from_secret(config.token_signing_secret.as_bytes())
        .map_err(|_| ConfigError::Invalid("TOKEN_SIGNING_SECRET"))?;

    tracing::info!(key = %key.fingerprint(), "token signing key loaded");

    let policy = GatePolicy {
        allowed_algorithms: config.token_allowed_algorithms.clone(),
        leeway_seconds: config.token_leeway_seconds,
        issuer: config.token_issuer.clone(),
        audience: config.token_audience.clone(),
    };

    Ok(Arc::new(TokenGate::new(Arc::new(KeyRing::new(key)), policy)))
}
