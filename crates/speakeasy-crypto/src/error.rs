//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Hex input could not be decoded.
    #[error("Invalid hex string: {0}")]
    Decode(String),

    /// Hex input decoded to the wrong number of bytes.
    #[error("Invalid hex length: expected {expected} bytes, got {actual}")]
    InvalidHexLength {
        /// Expected decoded length in bytes.
        expected: usize,
        /// Actual decoded length in bytes.
        actual: usize,
    },

    /// A device secret must contain at least one byte.
    #[error("Device secret is empty")]
    EmptyDeviceSecret,
}

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
