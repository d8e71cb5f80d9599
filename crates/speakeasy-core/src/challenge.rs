//! Single-use verification challenges.
//!
//! A fresh [`Challenge`] is issued per verification attempt by the
//! state machine and must be rejected once `expires_at` has passed.
//! The nonce makes each response unique; the salt feeds the challenge
//! message alongside it.

use serde::{Deserialize, Serialize};

use speakeasy_crypto::random_hex;

/// Challenge nonce size in bytes (64 hex chars).
pub const CHALLENGE_NONCE_SIZE: usize = 32;

/// Challenge salt size in bytes (32 hex chars).
pub const CHALLENGE_SALT_SIZE: usize = 16;

/// A single-use, time-bounded nonce/salt pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// 32-byte random nonce, hex-encoded.
    pub nonce: String,
    /// 16-byte random salt, hex-encoded.
    pub salt: String,
    /// Issue timestamp, Unix milliseconds.
    pub issued_at: u64,
    /// Expiry timestamp, Unix milliseconds.
    pub expires_at: u64,
}

impl Challenge {
    /// Issue a fresh challenge valid for `ttl_ms` from `now_ms`.
    pub fn issue(now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            nonce: random_hex(CHALLENGE_NONCE_SIZE),
            salt: random_hex(CHALLENGE_SALT_SIZE),
            issued_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    /// Whether the challenge has expired at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}
