//! # speakeasy-gesture
//!
//! Gesture data model and deterministic canonicalization for the
//! speakeasy doorman protocol.
//!
//! This crate provides:
//! - **GestureStep**: the closed vocabulary of ritual steps
//! - **GestureSequence**: one complete captured ritual
//! - **Canonicalizer**: jitter-tolerant serialization used as the key
//!   derivation input and as a diagnostic fingerprint
//!
//! The capture layer (pointer/touch handling) is an external
//! collaborator; this crate consumes already-assembled sequences and
//! never performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod sequence;

#[cfg(test)]
mod proptests;

pub use canonical::{bucket_hold_duration, canonicalize, fingerprint, HOLD_BUCKET_MS};
pub use sequence::{FlickDirection, GestureSequence, GestureStep, Region};
