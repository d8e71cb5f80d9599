//! SHA-256 / HMAC-SHA-256 primitives, randomness, and constant-time comparison.
//!
//! Every operation here is deterministic for identical inputs except the
//! random generators, which draw from the operating system RNG.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{CryptoError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Digest size in bytes for SHA-256 and HMAC-SHA-256.
pub const DIGEST_SIZE: usize = 32;

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let digest = Sha256::digest(data);
    digest.into()
}

/// Compute HMAC-SHA-256 of `msg` under `key`.
///
/// HMAC accepts keys of any length, so this never fails.
pub fn hmac_sha256(key: &[u8], msg: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(msg);
    mac.finalize().into_bytes().into()
}

/// Generate `n` cryptographically secure random bytes from OsRng.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; n];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate `n` random bytes and return them hex-encoded (`2 * n` chars).
pub fn random_hex(n: usize) -> String {
    hex::encode(random_bytes(n))
}

/// Compare two byte slices in constant time.
///
/// A length mismatch returns `false` immediately. Length is not secret
/// in this protocol (nonce, salt, and digest sizes are public), so the
/// fast path leaks nothing. Equal-length inputs are compared via
/// `subtle`, independent of where the first mismatching byte occurs.
pub fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Decode a hex string into bytes.
///
/// # Errors
///
/// Returns [`CryptoError::Decode`] if the input is not valid hex.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| CryptoError::Decode(e.to_string()))
}

/// Decode a hex string that must represent exactly `len` bytes.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidHexLength`] on a length mismatch and
/// [`CryptoError::Decode`] on malformed hex.
pub fn decode_hex_exact(s: &str, len: usize) -> Result<Vec<u8>> {
    if s.len() != len * 2 {
        return Err(CryptoError::InvalidHexLength {
            expected: len,
            actual: s.len() / 2,
        });
    }
    decode_hex(s)
}
