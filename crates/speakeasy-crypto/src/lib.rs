//! # speakeasy-crypto
//!
//! Cryptographic primitives for the speakeasy doorman protocol.
//!
//! This crate provides:
//! - **SHA-256** hashing and **HMAC-SHA-256** keyed hashing
//! - Cryptographically secure random byte generation (OsRng)
//! - Constant-time comparison for secret material
//! - Hex encoding/decoding with strict length validation
//! - [`DeviceSecret`]: the host-supplied secret mixed into derivation
//! - Domain-separation labels shared by every keyed operation
//!
//! ## Security
//!
//! All secret data uses `zeroize` for secure memory cleanup.
//! All comparisons of secrets use constant-time operations via `subtle`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod device_secret;
pub mod error;
pub mod labels;
pub mod primitives;

pub use device_secret::DeviceSecret;
pub use error::{CryptoError, Result};
pub use primitives::{
    decode_hex, decode_hex_exact, hmac_sha256, random_bytes, random_hex, sha256, timing_safe_eq,
    DIGEST_SIZE,
};
