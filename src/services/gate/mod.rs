pub mod claims;
pub mod decision;
pub mod envelope;
pub mod factory;
pub mod keys;
pub mod verifier;

pub use decision::{CapabilityLevel, Decision, DenyReason, VerifiedClaims};
pub use factory::build_token_gate;
pub use keys::{KeyRing, SigningKey};
pub use verifier::{GatePolicy, TokenGate};
