use std::fmt;
use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// HMAC secrets shorter than this are refused (RFC 7518 §3.2 for HS256).
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing secret must be at least {MIN_SECRET_BYTES} bytes (got {0})")]
    TooShort(usize),
}

/// Shared HMAC secret used to verify token signatures.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct SigningKey {
    decoding_key: DecodingKey,
    fingerprint: String,
}

impl SigningKey {
    pub fn from_secret(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(KeyError::TooShort(secret.len()));
        }

        let digest = Sha256::digest(secret);
        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            fingerprint: hex::encode(&digest[..8]),
        })
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Short, non-reversible identifier safe to put in logs.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Process-wide holder of the active signing key.
///
/// Readers take an `Arc` snapshot and verify against it; `rotate` swaps the
/// pointer under a short write lock, so a verification in flight keeps the
/// key it started with.
#[derive(Debug)]
pub struct KeyRing {
    current: RwLock<Arc<SigningKey>>,
}

impl KeyRing {
    pub fn new(key: SigningKey) -> Self {
        Self {
            current: RwLock::new(Arc::new(key)),
        }
    }

    pub fn current(&self) -> Arc<SigningKey> {
        self.current.read().clone()
    }

    /// Replace the active key. Returns the key that was retired.
    pub fn rotate(&self, next: SigningKey) -> Arc<SigningKey> {
        let next = Arc::new(next);
        std::mem::replace(&mut *self.current.write(), next)
    }

    pub fn fingerprint(&self) -> String {
        self.current().fingerprint().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_A: &[u8] = b"0123456789abcdef0123456789abcdef";
    const SECRET_B: &[u8] = b"fedcba9876543210fedcba9876543210";

    #[test]
    fn short_secret_is_rejected() {
        let err = SigningKey::from_secret(b"too-short").unwrap_err();
        assert_eq!(err, KeyError::TooShort(9));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = SigningKey::from_secret(SECRET_A).unwrap();
        let printed = format!("{key:?}");
        assert!(!printed.contains("0123456789abcdef"));
        assert!(printed.contains(key.fingerprint()));
        assert_eq!(key.fingerprint().len(), 16);
    }

    #[test]
    fn rotate_swaps_snapshot_without_touching_old_readers() {
        let ring = KeyRing::new(SigningKey::from_secret(SECRET_A).unwrap());
        let before = ring.current();

        let retired = ring.rotate(SigningKey::from_secret(SECRET_B).unwrap());

        assert_eq!(retired.fingerprint(), before.fingerprint());
        assert_ne!(ring.fingerprint(), before.fingerprint());
        // The snapshot taken before rotation is still the old key.
        assert_eq!(
            before.fingerprint(),
            SigningKey::from_secret(SECRET_A).unwrap().fingerprint()
        );
    }

    #[test]
    fn concurrent_readers_always_see_a_whole_key() {
        let a = SigningKey::from_secret(SECRET_A).unwrap();
        let b = SigningKey::from_secret(SECRET_B).unwrap();
        let known = [a.fingerprint().to_string(), b.fingerprint().to_string()];
        let ring = Arc::new(KeyRing::new(a.clone()));

        std::thread::scope(|s| {
            for _ in 0..4 {
                let ring = ring.clone();
                let known = known.clone();
                s.spawn(move || {
                    for _ in 0..1000 {
                        let fp = ring.fingerprint();
                        assert!(known.contains(&fp));
                    }
                });
            }
            for i in 0..100 {
                let next = if i % 2 == 0 { b.clone() } else { a.clone() };
                ring.rotate(next);
            }
        });
    }
}
