//! Capability token issuance and validation.
//!
//! A capability is minted only after a successful ritual and is bound
//! cryptographically to the verifier key that produced it: the signing
//! key is derived from the verifier key through a domain-separated
//! label, so a token minted under one verifier cannot validate under
//! another. There is no renewal; a new token requires a new ritual.

use serde::{Deserialize, Serialize};

use speakeasy_crypto::labels::capability_key_material;
use speakeasy_crypto::{
    decode_hex, decode_hex_exact, hmac_sha256, random_hex, sha256, timing_safe_eq, DIGEST_SIZE,
};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;

/// Token identifier size in bytes (32 hex chars).
const TOKEN_ID_SIZE: usize = 16;

/// A short-lived, scoped, signed credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityToken {
    /// Unique token identifier.
    pub token_id: String,
    /// Issuer name (host-chosen).
    pub issuer: String,
    /// Scopes this token grants.
    pub scopes: Vec<String>,
    /// Validity window start, Unix milliseconds (inclusive).
    pub not_before: u64,
    /// Validity window end, Unix milliseconds (exclusive).
    pub expires_at: u64,
    /// Hex-encoded HMAC-SHA-256 signature over the payload.
    pub signature: String,
}

/// Parameters for minting a capability token.
#[derive(Clone, Debug)]
pub struct CapabilityRequest<'a> {
    /// Hex-encoded verifier key the token is bound to.
    pub verifier_key_hex: &'a str,
    /// Issuer name.
    pub issuer: &'a str,
    /// Scopes to grant.
    pub scopes: Vec<String>,
    /// Token lifetime in milliseconds.
    pub ttl_ms: u64,
    /// Mint time, Unix milliseconds.
    pub now_ms: u64,
}

/// Host policy for tokens minted by the doorman orchestrator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilityPolicy {
    /// Issuer name stamped on minted tokens.
    pub issuer: String,
    /// Scopes granted on admission.
    pub scopes: Vec<String>,
    /// Token lifetime in milliseconds.
    pub ttl_ms: u64,
}

impl Default for CapabilityPolicy {
    fn default() -> Self {
        Self {
            issuer: "speakeasy".into(),
            scopes: vec!["privileged".into()],
            ttl_ms: 2 * 60 * 1000,
        }
    }
}

/// Derive the token signing key from the verifier key.
///
/// # Errors
///
/// Fails if `verifier_key_hex` is not a 64-char hex string. That value
/// is an internal invariant (it comes from the stored verifier), so a
/// malformed key is a hard error, unlike attacker-controlled token
/// fields which only ever yield `false` from verification.
fn signing_key(verifier_key_hex: &str) -> Result<[u8; DIGEST_SIZE]> {
    decode_hex_exact(verifier_key_hex, DIGEST_SIZE)?;
    Ok(sha256(capability_key_material(verifier_key_hex).as_bytes()))
}

/// Canonical payload string the signature covers.
fn token_payload(token: &CapabilityToken) -> String {
    format!(
        "speakeasy:v1|capability|id:{}|issuer:{}|scopes:{}|nbf:{}|exp:{}",
        token.token_id,
        token.issuer,
        token.scopes.join(","),
        token.not_before,
        token.expires_at
    )
}

/// Mint a signed capability token bound to a verifier key.
pub fn create_capability_token(request: CapabilityRequest<'_>) -> Result<CapabilityToken> {
    let key = signing_key(request.verifier_key_hex)?;
    let mut token = CapabilityToken {
        token_id: random_hex(TOKEN_ID_SIZE),
        issuer: request.issuer.to_string(),
        scopes: request.scopes,
        not_before: request.now_ms,
        expires_at: request.now_ms.saturating_add(request.ttl_ms),
        signature: String::new(),
    };
    token.signature = hex::encode(hmac_sha256(&key, token_payload(&token).as_bytes()));
    Ok(token)
}

/// Validate a capability token against a verifier key at `now_ms`.
///
/// Returns `Ok(false)` for any signature mismatch, malformed token
/// signature, or out-of-window check; the validity window is
/// `[not_before, expires_at)`. This function never errors on
/// attacker-controlled token contents, only on a malformed verifier
/// key (an internal invariant).
pub fn verify_capability_token(
    token: &CapabilityToken,
    verifier_key_hex: &str,
    now_ms: u64,
) -> Result<bool> {
    let key = signing_key(verifier_key_hex)?;
    let expected = hmac_sha256(&key, token_payload(token).as_bytes());
    let presented = match decode_hex(&token.signature) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };
    if !timing_safe_eq(&presented, &expected) {
        return Ok(false);
    }
    Ok(now_ms >= token.not_before && now_ms < token.expires_at)
}

/// Validate a capability token at the current wall-clock time.
pub fn verify_capability_token_now(
    token: &CapabilityToken,
    verifier_key_hex: &str,
) -> Result<bool> {
    verify_capability_token(token, verifier_key_hex, SystemClock.now_ms())
}
