//! # speakeasy-core
//!
//! The speakeasy doorman protocol: a local, device-bound
//! challenge-response system that gates entry into a privileged mode by
//! verifying a secret physical gesture, then issuing a short-lived
//! capability token.
//!
//! This crate provides:
//! - [`SpeakeasyAuth`]: gesture registration and verification against
//!   the stored verifier
//! - [`Challenge`]: single-use, time-bounded nonce/salt pair
//! - Capability issuance: [`create_capability_token`] /
//!   [`verify_capability_token`]
//! - [`DoormanStateMachine`]: knock → challenge → gesture → verify →
//!   admit/deny, with lockout, cooldown, and a panic/decoy escape hatch
//! - [`Doorman`]: the orchestrator wiring auth, issuer, and machine
//!
//! ## Security Model
//!
//! This is a local authentication primitive. It does not perform
//! biometric analysis, does not implement network transport, and does
//! not protect against a fully compromised device: the verifier key
//! and device secret share one trust boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod capability;
pub mod challenge;
pub mod clock;
pub mod config;
pub mod doorman;
pub mod error;
pub mod machine;

#[cfg(test)]
mod proptests;

pub use auth::{RejectReason, SpeakeasyAuth, Verdict};
pub use capability::{
    create_capability_token, verify_capability_token, verify_capability_token_now,
    CapabilityPolicy, CapabilityRequest, CapabilityToken,
};
pub use challenge::{Challenge, CHALLENGE_NONCE_SIZE, CHALLENGE_SALT_SIZE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{is_panic_gesture, ConfigError, DoormanConfig, PanicAction, PanicPattern};
pub use doorman::{Doorman, GestureOutcome};
pub use error::{AuthError, Result};
pub use machine::{DoormanEvent, DoormanSnapshot, DoormanState, DoormanStateMachine};
