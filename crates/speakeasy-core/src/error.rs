//! Error types for the doorman protocol core.
//!
//! Protocol rejections (`not_registered`, `domain_mismatch`,
//! `invalid_gesture`) are NOT errors: a fumbling legitimate user
//! produces them constantly, so they travel as [`crate::Verdict`]
//! values. The variants here cover configuration mistakes and
//! malformed input, which indicate an integration bug.

use thiserror::Error;

/// Errors that can occur during doorman protocol operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No domain was supplied at construction.
    ///
    /// Domain binding is the anti-phishing control; there is no
    /// browser origin to default to in this host, so absence is a hard
    /// construction error, never a silent default.
    #[error("Domain is required and must be non-empty")]
    MissingDomain,

    /// An operation that requires a registered verifier found none.
    #[error("No verifier registered for this domain")]
    NotRegistered,

    /// A challenge carried malformed nonce or salt hex.
    #[error("Invalid challenge: {0}")]
    InvalidChallenge(String),

    /// Cryptographic operation failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] speakeasy_crypto::CryptoError),

    /// Storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] speakeasy_store::StoreError),

    /// Doorman configuration failed validation.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// Result type for doorman protocol operations.
pub type Result<T> = std::result::Result<T, AuthError>;
