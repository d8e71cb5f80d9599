//! Structured domain separation for the speakeasy protocol.
//!
//! Every keyed operation hashes a byte string that starts with the
//! versioned `speakeasy:v1` prefix and a purpose-specific layout, so a
//! valid output from one context (verifier derivation, challenge
//! response, capability signature) can never be replayed in another.

/// Versioned protocol prefix shared by all derivation inputs.
pub const PROTOCOL_V1: &str = "speakeasy:v1";

/// Build the derivation header binding a verifier key to its domain and salt.
///
/// Format: `speakeasy:v1|domain:<domain>|salt:<salt_hex>|`
///
/// The trailing separator keeps the header unambiguous when the
/// canonical gesture string is appended directly after it.
pub fn derivation_header(domain: &str, salt_hex: &str) -> String {
    format!("{PROTOCOL_V1}|domain:{domain}|salt:{salt_hex}|")
}

/// Build the challenge-response message.
///
/// Format: `speakeasy:v1|nonce:<nonce_hex>|salt:<salt_hex>|rhythm:<rhythm_hash>`
///
/// The rhythm hash binds the response to the specific timing
/// fingerprint the caller captured without that fingerprint ever being
/// persisted.
pub fn challenge_message(nonce_hex: &str, salt_hex: &str, rhythm_hash: &str) -> String {
    format!("{PROTOCOL_V1}|nonce:{nonce_hex}|salt:{salt_hex}|rhythm:{rhythm_hash}")
}

/// Build the key material for capability-token signing.
///
/// Format: `speakeasy:v1|capability-key|<verifier_key_hex>`
///
/// Hashing this yields the signing key, which binds every token
/// cryptographically to the verifier that produced it.
pub fn capability_key_material(verifier_key_hex: &str) -> String {
    format!("{PROTOCOL_V1}|capability-key|{verifier_key_hex}")
}

/// Build the key material for encrypting the verifier store at rest.
///
/// Format: `speakeasy:v1|store-key|` followed by the raw device secret
/// bytes (appended by the caller). Kept as a prefix constant so the
/// store crate does not invent its own label scheme.
pub const STORE_KEY_PREFIX: &str = "speakeasy:v1|store-key|";
