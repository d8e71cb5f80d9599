//! # speakeasy-store
//!
//! Verifier persistence for the speakeasy doorman protocol.
//!
//! Provides:
//! - [`Verifier`]: the single at-rest secret, a keyed digest derived
//!   from a registered gesture (never the gesture itself)
//! - [`VerifierStore`]: the storage contract the auth layer consumes
//! - [`MemoryVerifierStore`]: in-memory backend for tests and ephemeral hosts
//! - [`EncryptedVerifierStore`]: sled-backed storage, encrypted at rest
//!   with XChaCha20-Poly1305 under a key derived from the device secret
//!
//! ## Security
//!
//! A verifier record must never leave the device and must never be
//! reversible to the original gesture without brute-forcing the gesture
//! space. The encrypted backend additionally hides the record from
//! other processes reading the data directory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encrypted;
pub mod error;
pub mod verifier;

pub use encrypted::EncryptedVerifierStore;
pub use error::{Result, StoreError};
pub use verifier::{MemoryVerifierStore, Verifier, VerifierStore, VERIFIER_VERSION};
