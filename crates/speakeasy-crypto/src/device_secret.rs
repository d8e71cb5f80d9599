//! Device-bound secret used in verifier key derivation.
//!
//! The device secret is a host-supplied, non-gesture secret mixed into
//! key derivation so that a stored verifier is useless on any other
//! device. It must be stable across the registration/verification
//! lifetime of a verifier: if the host rotates it, verification simply
//! stops matching (surfaced as an invalid-gesture rejection, not an
//! error).
//!
//! ## Security Model
//!
//! The secret lives in the same trust boundary as the verifier store.
//! It does not protect against a fully compromised device; it binds
//! the at-rest verifier to this installation.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, Result};
use crate::primitives::random_bytes;

/// Number of bytes generated for a fresh device secret.
pub const DEVICE_SECRET_SIZE: usize = 32;

/// A device-bound secret, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DeviceSecret {
    bytes: Vec<u8>,
}

impl DeviceSecret {
    /// Generate a fresh 32-byte device secret using OsRng.
    ///
    /// Generated once per installation and persisted by the host.
    pub fn generate() -> Self {
        Self {
            bytes: random_bytes(DEVICE_SECRET_SIZE),
        }
    }

    /// Restore a device secret from host-persisted bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptyDeviceSecret`] if `bytes` is empty.
    /// Construction must fail fast: a missing secret silently defaulted
    /// would produce verifiers that no other session can match.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(CryptoError::EmptyDeviceSecret);
        }
        Ok(Self { bytes })
    }

    /// Get the secret as a byte slice.
    ///
    /// # Security
    ///
    /// Be careful with this - avoid logging or persisting the returned bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for DeviceSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeviceSecret([REDACTED])")
    }
}
