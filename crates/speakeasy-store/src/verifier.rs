//! The verifier record and the storage contract.
//!
//! Exactly one live [`Verifier`] exists per (storage instance, domain):
//! created by registration, overwritten by re-registration, deleted by
//! `clear_verifier`. The record holds only the canonicalized-and-keyed
//! digest of the gesture; step-level data never reaches storage.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Current verifier record version.
pub const VERIFIER_VERSION: u32 = 1;

/// The persisted, keyed digest derived from a registered gesture.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verifier {
    /// 32-byte keyed digest, hex-encoded (64 chars).
    pub hash: String,
    /// 16-byte random salt, hex-encoded (32 chars).
    pub salt: String,
    /// Domain the verifier is bound to (the anti-phishing control).
    pub domain: String,
    /// Creation timestamp, Unix milliseconds.
    pub created_at: u64,
    /// Record format version.
    pub version: u32,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The hash is a derived secret; show only a prefix.
        let prefix = &self.hash[..self.hash.len().min(8)];
        f.debug_struct("Verifier")
            .field("hash", &format!("{prefix}..."))
            .field("domain", &self.domain)
            .field("created_at", &self.created_at)
            .field("version", &self.version)
            .finish()
    }
}

/// Storage contract the auth layer consumes.
///
/// The core is backend-agnostic: in-memory or encrypted-at-rest
/// implementations are both valid as long as `set_verifier` replaces
/// any prior record atomically (no reader observes a half-written
/// verifier).
pub trait VerifierStore {
    /// Load the stored verifier, if any.
    fn get_verifier(&self) -> Result<Option<Verifier>>;

    /// Store a verifier, replacing any prior record.
    fn set_verifier(&self, verifier: Verifier) -> Result<()>;

    /// Delete the stored verifier, if any.
    fn clear_verifier(&self) -> Result<()>;
}

impl<T: VerifierStore + ?Sized> VerifierStore for &T {
    fn get_verifier(&self) -> Result<Option<Verifier>> {
        (**self).get_verifier()
    }

    fn set_verifier(&self, verifier: Verifier) -> Result<()> {
        (**self).set_verifier(verifier)
    }

    fn clear_verifier(&self) -> Result<()> {
        (**self).clear_verifier()
    }
}

impl<T: VerifierStore + ?Sized> VerifierStore for std::sync::Arc<T> {
    fn get_verifier(&self) -> Result<Option<Verifier>> {
        (**self).get_verifier()
    }

    fn set_verifier(&self, verifier: Verifier) -> Result<()> {
        (**self).set_verifier(verifier)
    }

    fn clear_verifier(&self) -> Result<()> {
        (**self).clear_verifier()
    }
}

/// In-memory verifier store for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryVerifierStore {
    slot: Mutex<Option<Verifier>>,
}

impl MemoryVerifierStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VerifierStore for MemoryVerifierStore {
    fn get_verifier(&self) -> Result<Option<Verifier>> {
        Ok(self.slot.lock().expect("store mutex poisoned").clone())
    }

    fn set_verifier(&self, verifier: Verifier) -> Result<()> {
        *self.slot.lock().expect("store mutex poisoned") = Some(verifier);
        Ok(())
    }

    fn clear_verifier(&self) -> Result<()> {
        *self.slot.lock().expect("store mutex poisoned") = None;
        Ok(())
    }
}
