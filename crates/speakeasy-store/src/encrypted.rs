//! Encrypted verifier store backed by sled + XChaCha20-Poly1305.
//!
//! The verifier record is serialized as JSON and sealed with
//! XChaCha20-Poly1305 before it touches disk. The encryption key is
//! derived from the device secret through a domain-separated SHA-256
//! label, so the record is unreadable off-device and any tampering is
//! caught by the AEAD tag.
//!
//! ## Security
//!
//! - The device secret is NEVER stored
//! - Each write uses a fresh random 24-byte nonce
//! - The key is zeroized on drop
//! - Decryption or parse failure surfaces as `StoreError::Corruption`

use std::path::Path;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use speakeasy_crypto::labels::STORE_KEY_PREFIX;
use speakeasy_crypto::{random_bytes, sha256, DeviceSecret};

use crate::error::{Result, StoreError};
use crate::verifier::{Verifier, VerifierStore};

/// Envelope format version.
const ENVELOPE_VERSION: u8 = 1;

/// Nonce size in bytes (192 bits for XChaCha20).
const NONCE_SIZE: usize = 24;

/// Record key for the single verifier slot.
const VERIFIER_KEY: &[u8] = b"verifier";

/// The store encryption key, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct StoreKey {
    bytes: [u8; 32],
}

impl StoreKey {
    /// Derive the store key from the device secret.
    ///
    /// Domain-separated so the store key can never collide with a
    /// verifier key or capability signing key derived from the same
    /// secret.
    fn derive(device_secret: &DeviceSecret) -> Self {
        let mut material = Vec::with_capacity(STORE_KEY_PREFIX.len() + device_secret.as_bytes().len());
        material.extend_from_slice(STORE_KEY_PREFIX.as_bytes());
        material.extend_from_slice(device_secret.as_bytes());
        let bytes = sha256(&material);
        material.zeroize();
        Self { bytes }
    }
}

impl std::fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreKey([REDACTED])")
    }
}

/// A sled-backed verifier store, encrypted at rest.
pub struct EncryptedVerifierStore {
    db: sled::Db,
    key: StoreKey,
    path: std::path::PathBuf,
}

impl std::fmt::Debug for EncryptedVerifierStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedVerifierStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EncryptedVerifierStore {
    /// Open or create an encrypted verifier store.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the database directory
    /// * `device_secret` - The device secret; the encryption key is
    ///   derived from it and the secret itself is never persisted
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the database cannot be opened.
    pub fn open(path: &Path, device_secret: &DeviceSecret) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| StoreError::Database(format!("failed to open database: {}", e)))?;
        Ok(Self {
            db,
            key: StoreKey::derive(device_secret),
            path: path.to_path_buf(),
        })
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new_from_slice(&self.key.bytes)
            .map_err(|e| StoreError::Database(format!("cipher init failed: {}", e)))?;
        let nonce_bytes = random_bytes(NONCE_SIZE);
        let nonce = XNonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| StoreError::Database("encryption failed".into()))?;

        let mut envelope = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
        envelope.push(ENVELOPE_VERSION);
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);
        Ok(envelope)
    }

    fn unseal(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        if envelope.len() < 1 + NONCE_SIZE {
            return Err(StoreError::Corruption(format!(
                "envelope too short: {} bytes",
                envelope.len()
            )));
        }
        if envelope[0] != ENVELOPE_VERSION {
            return Err(StoreError::Corruption(format!(
                "unknown envelope version: {}",
                envelope[0]
            )));
        }
        let cipher = XChaCha20Poly1305::new_from_slice(&self.key.bytes)
            .map_err(|e| StoreError::Database(format!("cipher init failed: {}", e)))?;
        let nonce = XNonce::from_slice(&envelope[1..1 + NONCE_SIZE]);
        cipher
            .decrypt(nonce, &envelope[1 + NONCE_SIZE..])
            .map_err(|_| StoreError::Corruption("authentication failed".into()))
    }
}

impl VerifierStore for EncryptedVerifierStore {
    fn get_verifier(&self) -> Result<Option<Verifier>> {
        match self
            .db
            .get(VERIFIER_KEY)
            .map_err(|e| StoreError::Database(format!("failed to get: {}", e)))?
        {
            Some(envelope) => {
                let plaintext = self.unseal(&envelope)?;
                let verifier: Verifier = serde_json::from_slice(&plaintext)
                    .map_err(|e| StoreError::Corruption(format!("invalid record: {}", e)))?;
                Ok(Some(verifier))
            }
            None => Ok(None),
        }
    }

    fn set_verifier(&self, verifier: Verifier) -> Result<()> {
        let plaintext = serde_json::to_vec(&verifier)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        // Seal fully before touching the database: the insert below is
        // the single atomic publish point.
        let envelope = self.seal(&plaintext)?;
        self.db
            .insert(VERIFIER_KEY, envelope)
            .map_err(|e| StoreError::Database(format!("failed to insert: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| StoreError::Database(format!("failed to flush: {}", e)))?;
        debug!(domain = %verifier.domain, "verifier record written");
        Ok(())
    }

    fn clear_verifier(&self) -> Result<()> {
        self.db
            .remove(VERIFIER_KEY)
            .map_err(|e| StoreError::Database(format!("failed to delete: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| StoreError::Database(format!("failed to flush: {}", e)))?;
        debug!("verifier record cleared");
        Ok(())
    }
}
