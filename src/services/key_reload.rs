//! Out-of-band signing key rotation.
//!
//! When the secret comes from a file, SIGHUP re-reads it and swaps the new
//! key into the ring. A bad file leaves the current key in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::trim_secret;
use crate::services::gate::{KeyRing, SigningKey};

#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to read secret file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Key(#[from] crate::services::gate::keys::KeyError),
}

/// Read the secret file and rotate it in. Returns the new fingerprint.
pub async fn reload_from_file(keys: &KeyRing, path: &Path) -> Result<String, ReloadError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReloadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let next = SigningKey::from_secret(trim_secret(&raw).as_bytes())?;
    let fingerprint = next.fingerprint().to_string();
    let retired = keys.rotate(next);

    tracing::info!(
        retired = %retired.fingerprint(),
        active = %fingerprint,
        "token signing key rotated"
    );
    Ok(fingerprint)
}

/// Spawn the SIGHUP listener. No-op off unix.
pub fn spawn_on_sighup(keys: Arc<KeyRing>, path: PathBuf) {
    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(err) => {
                tracing::error!(error = %err, "cannot install SIGHUP handler; key reload disabled");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            if let Err(err) = reload_from_file(&keys, &path).await {
                tracing::warn!(error = %err, "key reload failed; keeping current key");
            }
        }
    });

    #[cfg(not(unix))]
    {
        let _ = (keys, path);
        tracing::warn!("key reload on SIGHUP is only supported on unix");
    }
}
