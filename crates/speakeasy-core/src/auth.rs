//! Verifier derivation, registration, and verification.
//!
//! The at-rest secret is the verifier key, never the raw gesture:
//! `key = SHA256(header(domain, salt) || canonical(sequence) || device_secret)`.
//! Deriving per-domain and mixing in the device secret means a leaked
//! verifier is useless on another domain or another device, and the
//! original gesture cannot be recovered from it without replaying the
//! gesture space.
//!
//! Protocol rejections are returned as [`Verdict`] values, never as
//! errors; see [`crate::error`] for the split.

use tracing::{debug, info};
use zeroize::Zeroize;

use speakeasy_crypto::labels::{challenge_message, derivation_header};
use speakeasy_crypto::{
    decode_hex_exact, hmac_sha256, random_hex, sha256, timing_safe_eq, DeviceSecret, DIGEST_SIZE,
};
use speakeasy_gesture::{canonicalize, GestureSequence};
use speakeasy_store::{Verifier, VerifierStore, VERIFIER_VERSION};

use crate::challenge::{Challenge, CHALLENGE_NONCE_SIZE, CHALLENGE_SALT_SIZE};
use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, Result};

/// Verifier salt size in bytes (32 hex chars).
pub const VERIFIER_SALT_SIZE: usize = 16;

/// Why a verification attempt was rejected.
///
/// These are expected, recoverable outcomes: an attacker or a fumbling
/// legitimate user produces them constantly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// No verifier is registered in this store.
    NotRegistered,
    /// The stored verifier is bound to a different domain.
    DomainMismatch,
    /// The gesture did not reproduce the registered verifier key.
    InvalidGesture,
}

impl RejectReason {
    /// Stable wire name for logs and host-facing results.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotRegistered => "not_registered",
            RejectReason::DomainMismatch => "domain_mismatch",
            RejectReason::InvalidGesture => "invalid_gesture",
        }
    }
}

/// Outcome of a verification attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The gesture matched; `response` is the hex-encoded HMAC response.
    Pass {
        /// Hex-encoded challenge response.
        response: String,
    },
    /// The gesture was rejected.
    Fail(RejectReason),
}

impl Verdict {
    /// Whether this verdict admits the caller.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }
}

/// Orchestrates registration and verification against a verifier store.
pub struct SpeakeasyAuth<S, C = SystemClock> {
    store: S,
    domain: String,
    device_secret: DeviceSecret,
    clock: C,
}

impl<S: VerifierStore> SpeakeasyAuth<S, SystemClock> {
    /// Create an auth instance over `store`, bound to `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingDomain`] if `domain` is empty. The
    /// device secret type has already rejected empty bytes, so both
    /// configuration errors fail fast at construction.
    pub fn new(store: S, domain: impl Into<String>, device_secret: DeviceSecret) -> Result<Self> {
        Self::with_clock(store, domain, device_secret, SystemClock)
    }
}

impl<S: VerifierStore, C: Clock> SpeakeasyAuth<S, C> {
    /// Create an auth instance with an injected clock (for tests).
    pub fn with_clock(
        store: S,
        domain: impl Into<String>,
        device_secret: DeviceSecret,
        clock: C,
    ) -> Result<Self> {
        let domain = domain.into();
        if domain.is_empty() {
            return Err(AuthError::MissingDomain);
        }
        Ok(Self {
            store,
            domain,
            device_secret,
            clock,
        })
    }

    /// The domain this instance is bound to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Derive the verifier key for a gesture under the given salt.
    fn derive_key(&self, salt_hex: &str, sequence: &GestureSequence) -> [u8; DIGEST_SIZE] {
        let header = derivation_header(&self.domain, salt_hex);
        let canonical = canonicalize(sequence);
        let mut material =
            Vec::with_capacity(header.len() + canonical.len() + self.device_secret.as_bytes().len());
        material.extend_from_slice(header.as_bytes());
        material.extend_from_slice(canonical.as_bytes());
        material.extend_from_slice(self.device_secret.as_bytes());
        let key = sha256(&material);
        material.zeroize();
        key
    }

    /// Build the challenge-response message, validating the challenge shape.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidChallenge`] on a malformed nonce or
    /// salt. Malformed input here is a caller/integration bug, not a
    /// security event, so it is a hard error rather than a rejection.
    fn build_message(&self, challenge: &Challenge, rhythm_hash: &str) -> Result<String> {
        decode_hex_exact(&challenge.nonce, CHALLENGE_NONCE_SIZE)
            .map_err(|e| AuthError::InvalidChallenge(format!("nonce: {}", e)))?;
        decode_hex_exact(&challenge.salt, CHALLENGE_SALT_SIZE)
            .map_err(|e| AuthError::InvalidChallenge(format!("salt: {}", e)))?;
        Ok(challenge_message(
            &challenge.nonce,
            &challenge.salt,
            rhythm_hash,
        ))
    }

    /// Register a gesture, deriving and storing its verifier.
    ///
    /// Generates a fresh random salt and replaces any prior verifier
    /// for this (storage, domain) pair. Returns the stored verifier.
    pub fn register_gesture(&self, sequence: &GestureSequence) -> Result<Verifier> {
        let salt = random_hex(VERIFIER_SALT_SIZE);
        let key = self.derive_key(&salt, sequence);
        let verifier = Verifier {
            hash: hex::encode(key),
            salt,
            domain: self.domain.clone(),
            created_at: self.clock.now_ms(),
            version: VERIFIER_VERSION,
        };
        self.store.set_verifier(verifier.clone())?;
        info!(domain = %self.domain, "gesture registered");
        Ok(verifier)
    }

    /// Verify a gesture against the stored verifier for a challenge.
    ///
    /// The domain check runs before any crypto so it cannot leak timing
    /// about key correctness. On a match the hex-encoded response is
    /// returned; mismatches are [`Verdict::Fail`] values.
    pub fn verify_gesture(
        &self,
        sequence: &GestureSequence,
        challenge: &Challenge,
    ) -> Result<Verdict> {
        let Some(verifier) = self.store.get_verifier()? else {
            return Ok(Verdict::Fail(RejectReason::NotRegistered));
        };
        if verifier.domain != self.domain {
            debug!(stored = %verifier.domain, ours = %self.domain, "domain mismatch");
            return Ok(Verdict::Fail(RejectReason::DomainMismatch));
        }

        let message = self.build_message(challenge, &sequence.rhythm_hash)?;
        let stored_key = decode_hex_exact(&verifier.hash, DIGEST_SIZE)?;
        let derived_key = self.derive_key(&verifier.salt, sequence);

        let expected = hmac_sha256(&stored_key, message.as_bytes());
        let actual = hmac_sha256(&derived_key, message.as_bytes());

        if timing_safe_eq(&expected, &actual) {
            Ok(Verdict::Pass {
                response: hex::encode(actual),
            })
        } else {
            Ok(Verdict::Fail(RejectReason::InvalidGesture))
        }
    }

    /// Compute the raw challenge response for a gesture.
    ///
    /// Same derivation/HMAC path as [`Self::verify_gesture`], without
    /// the stored-verifier comparison.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotRegistered`] if no verifier exists.
    pub fn compute_response(
        &self,
        sequence: &GestureSequence,
        challenge: &Challenge,
    ) -> Result<String> {
        let Some(verifier) = self.store.get_verifier()? else {
            return Err(AuthError::NotRegistered);
        };
        let message = self.build_message(challenge, &sequence.rhythm_hash)?;
        let derived_key = self.derive_key(&verifier.salt, sequence);
        Ok(hex::encode(hmac_sha256(&derived_key, message.as_bytes())))
    }

    /// Whether a verifier is registered in this store.
    pub fn is_registered(&self) -> Result<bool> {
        Ok(self.store.get_verifier()?.is_some())
    }

    /// Load the stored verifier, if any.
    pub fn get_verifier(&self) -> Result<Option<Verifier>> {
        Ok(self.store.get_verifier()?)
    }

    /// Delete the stored verifier.
    pub fn clear(&self) -> Result<()> {
        self.store.clear_verifier()?;
        info!(domain = %self.domain, "verifier cleared");
        Ok(())
    }
}
