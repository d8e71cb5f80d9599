//! The doorman orchestrator.
//!
//! [`Doorman`] wires the three moving parts together: the gesture
//! verifier ([`SpeakeasyAuth`]), the capability issuer, and the
//! [`DoormanStateMachine`]. Hosts hand it raw gesture captures and
//! knock/exit signals; it runs the panic-pattern check, drives
//! verification, mints the capability on success, and feeds the
//! resulting events through the machine.
//!
//! The panic check runs BEFORE verification, so the panic gesture works
//! whether or not it happens to match the registered one, and the
//! timing of the response does not reveal which path was taken to a
//! shoulder-surfer watching the screen.

use tracing::{debug, info, warn};

use speakeasy_crypto::DeviceSecret;
use speakeasy_gesture::GestureSequence;
use speakeasy_store::{Verifier, VerifierStore};

use crate::auth::{RejectReason, SpeakeasyAuth, Verdict};
use crate::capability::{create_capability_token, CapabilityPolicy, CapabilityRequest};
use crate::clock::{Clock, SystemClock};
use crate::config::DoormanConfig;
use crate::error::Result;
use crate::machine::{DoormanEvent, DoormanSnapshot, DoormanState, DoormanStateMachine};

/// What the doorman did with a submitted gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No challenge was outstanding (or it had expired); nothing happened.
    Ignored,
    /// The panic gesture fired; the configured panic action was taken.
    PanicTriggered,
    /// The gesture verified; the doorman is admitted and holds a capability.
    Verified,
    /// The gesture was rejected.
    Rejected(RejectReason),
}

/// The doorman: gesture auth, capability issuance, and the admission
/// state machine behind one interface.
pub struct Doorman<S, C = SystemClock> {
    auth: SpeakeasyAuth<S, C>,
    machine: DoormanStateMachine<C>,
    policy: CapabilityPolicy,
    clock: C,
}

impl<S: VerifierStore> Doorman<S, SystemClock> {
    /// Create a doorman over the given store and domain.
    ///
    /// # Errors
    ///
    /// Fails on an empty domain or an invalid config.
    pub fn new(
        store: S,
        domain: impl Into<String>,
        device_secret: DeviceSecret,
        config: DoormanConfig,
    ) -> Result<Self> {
        Self::with_clock(store, domain, device_secret, config, SystemClock)
    }
}

impl<S: VerifierStore, C: Clock + Clone> Doorman<S, C> {
    /// Create a doorman with an injected clock (for tests).
    pub fn with_clock(
        store: S,
        domain: impl Into<String>,
        device_secret: DeviceSecret,
        config: DoormanConfig,
        clock: C,
    ) -> Result<Self> {
        config.validate()?;
        let auth = SpeakeasyAuth::with_clock(store, domain, device_secret, clock.clone())?;
        let machine = DoormanStateMachine::new(config, clock.clone());
        Ok(Self {
            auth,
            machine,
            policy: CapabilityPolicy::default(),
            clock,
        })
    }

    /// Replace the capability policy used for minted tokens.
    pub fn set_policy(&mut self, policy: CapabilityPolicy) {
        self.policy = policy;
    }

    /// Replace the doorman configuration after validating it.
    pub fn set_config(&mut self, config: DoormanConfig) -> Result<()> {
        config.validate()?;
        self.machine.set_config(config);
        Ok(())
    }

    /// Read-only snapshot of the current state.
    pub fn snapshot(&self) -> &DoormanSnapshot {
        self.machine.state()
    }

    /// Register a gesture as the entry secret.
    pub fn register_gesture(&self, sequence: &GestureSequence) -> Result<Verifier> {
        self.auth.register_gesture(sequence)
    }

    /// Whether an entry gesture is registered.
    pub fn is_registered(&self) -> Result<bool> {
        self.auth.is_registered()
    }

    /// Delete the registered gesture's verifier.
    pub fn clear_registration(&self) -> Result<()> {
        self.auth.clear()
    }

    /// Signal the entry knock. Issues a challenge when idle; otherwise
    /// a no-op.
    pub fn knock(&mut self) -> &DoormanSnapshot {
        self.machine.dispatch(DoormanEvent::KnockDetected)
    }

    /// Leave the privileged (or decoy) mode.
    pub fn exit(&mut self) -> &DoormanSnapshot {
        self.machine.dispatch(DoormanEvent::ExitRequested)
    }

    /// Fire the current state's deadline if it has passed.
    pub fn tick(&mut self) -> Option<DoormanEvent> {
        self.machine.tick()
    }

    /// Feed a raw event through the state machine.
    ///
    /// [`Self::submit_gesture`] covers the gesture path; this is for
    /// host-driven signals and tests.
    pub fn dispatch(&mut self, event: DoormanEvent) -> &DoormanSnapshot {
        self.machine.dispatch(event)
    }

    /// Submit a captured gesture against the outstanding challenge.
    ///
    /// Runs the panic check, then verification, and drives the machine
    /// with the result. Rejections come back as
    /// [`GestureOutcome::Rejected`]; `Err` means an integration fault
    /// (malformed challenge, storage failure), which also counts as a
    /// failed attempt so the machine never wedges in `Verifying`.
    pub fn submit_gesture(&mut self, sequence: &GestureSequence) -> Result<GestureOutcome> {
        if self.machine.state().state != DoormanState::Challenged {
            debug!(state = ?self.machine.state().state, "gesture without outstanding challenge");
            return Ok(GestureOutcome::Ignored);
        }

        if self.is_panic(sequence) {
            self.machine.dispatch(DoormanEvent::PanicGesture);
            return Ok(GestureOutcome::PanicTriggered);
        }

        self.machine.dispatch(DoormanEvent::GestureComplete);
        if self.machine.state().state != DoormanState::Verifying {
            // The challenge had expired; the machine ignored the gesture.
            return Ok(GestureOutcome::Ignored);
        }

        let challenge = self
            .machine
            .state()
            .challenge
            .clone()
            .expect("Verifying always holds a challenge");

        match self.verify_and_mint(sequence, &challenge) {
            Ok(Ok(capability)) => {
                info!("gesture verified, admitting");
                self.machine
                    .dispatch(DoormanEvent::VerificationSucceeded { capability });
                Ok(GestureOutcome::Verified)
            }
            Ok(Err(reason)) => {
                self.machine.dispatch(DoormanEvent::VerificationFailed);
                Ok(GestureOutcome::Rejected(reason))
            }
            Err(err) => {
                warn!(error = %err, "verification errored, counting as failure");
                self.machine.dispatch(DoormanEvent::VerificationFailed);
                Err(err)
            }
        }
    }

    fn is_panic(&self, sequence: &GestureSequence) -> bool {
        let config = self.machine.config();
        config.panic_gesture_enabled
            && config
                .panic_pattern
                .as_ref()
                .is_some_and(|p| p.matches(sequence))
    }

    /// Verify the gesture and, on a pass, mint the capability.
    ///
    /// The inner `Err` is a rejection, which the machine treats
    /// uniformly regardless of reason; the reason travels back to the
    /// host in the [`GestureOutcome`].
    fn verify_and_mint(
        &self,
        sequence: &GestureSequence,
        challenge: &crate::challenge::Challenge,
    ) -> Result<std::result::Result<crate::capability::CapabilityToken, RejectReason>> {
        match self.auth.verify_gesture(sequence, challenge)? {
            Verdict::Pass { .. } => {
                let Some(verifier) = self.auth.get_verifier()? else {
                    // Cleared between verify and mint; treat as rejection.
                    return Ok(Err(RejectReason::NotRegistered));
                };
                let token = create_capability_token(CapabilityRequest {
                    verifier_key_hex: &verifier.hash,
                    issuer: &self.policy.issuer,
                    scopes: self.policy.scopes.clone(),
                    ttl_ms: self.policy.ttl_ms,
                    now_ms: self.clock.now_ms(),
                })?;
                Ok(Ok(token))
            }
            Verdict::Fail(reason) => {
                debug!(reason = reason.as_str(), "gesture rejected");
                Ok(Err(reason))
            }
        }
    }
}
