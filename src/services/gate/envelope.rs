//! Structural parse of a compact JWS (`header.payload.signature`).
//!
//! This runs before `jsonwebtoken` sees the token so that the declared
//! algorithm can be inspected even when it is one the library refuses to
//! name (e.g. `none`).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

use super::decision::DenyReason;

#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

/// A token whose three segments decode, with the header's `alg` extracted.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub alg: String,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

pub fn parse(token: &str) -> Result<Envelope, DenyReason> {
    // Anything after the second dot belongs to the signature segment.
    let mut parts = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(DenyReason::MalformedToken);
    };

    if header.is_empty() || payload.is_empty() {
        return Err(DenyReason::MalformedToken);
    }

    let header = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| DenyReason::MalformedToken)?;
    let header: RawHeader =
        serde_json::from_slice(&header).map_err(|_| DenyReason::MalformedToken)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| DenyReason::MalformedToken)?;

    // A signature segment that is not even base64url cannot verify.
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| DenyReason::InvalidSignature)?;

    Ok(Envelope {
        alg: header.alg,
        payload,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(s: &str) -> String {
        URL_SAFE_NO_PAD.encode(s.as_bytes())
    }

    #[test]
    fn extracts_declared_algorithm() {
        let token = format!(
            "{}.{}.{}",
            b64(r#"{"alg":"HS256","typ":"JWT"}"#),
            b64(r#"{"sub":"u1"}"#),
            URL_SAFE_NO_PAD.encode([1u8, 2, 3])
        );
        let env = parse(&token).unwrap();
        assert_eq!(env.alg, "HS256");
        assert_eq!(env.signature, vec![1, 2, 3]);
    }

    #[test]
    fn unsigned_token_still_parses() {
        let token = format!("{}.{}.", b64(r#"{"alg":"none"}"#), b64(r#"{"sub":"u1"}"#));
        let env = parse(&token).unwrap();
        assert_eq!(env.alg, "none");
        assert!(env.signature.is_empty());
    }

    #[test]
    fn short_or_undecodable_tokens_are_malformed() {
        for token in ["", "abc", "a.b", "...", "a.b.c.d"] {
            assert_eq!(parse(token).unwrap_err(), DenyReason::MalformedToken, "{token}");
        }
    }

    #[test]
    fn header_without_alg_is_malformed() {
        let token = format!("{}.{}.", b64(r#"{"typ":"JWT"}"#), b64("{}"));
        assert_eq!(parse(&token).unwrap_err(), DenyReason::MalformedToken);
    }

    #[test]
    fn non_json_header_is_malformed() {
        let token = format!("{}.{}.", b64("not json"), b64("{}"));
        assert_eq!(parse(&token).unwrap_err(), DenyReason::MalformedToken);
    }

    #[test]
    fn extra_dot_stays_in_the_signature() {
        let token = format!(
            "{}.{}.AQID.BAU",
            b64(r#"{"alg":"HS256"}"#),
            b64(r#"{"sub":"u1"}"#)
        );
        assert_eq!(parse(&token).unwrap_err(), DenyReason::InvalidSignature);
    }

    #[test]
    fn garbage_signature_is_invalid_signature() {
        let token = format!("{}.{}.!!!", b64(r#"{"alg":"HS256"}"#), b64("{}"));
        assert_eq!(parse(&token).unwrap_err(), DenyReason::InvalidSignature);
    }
}
