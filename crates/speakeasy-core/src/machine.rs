//! The doorman state machine.
//!
//! Sequences knock → challenge → gesture → verify → admit/deny, tracks
//! consecutive failures, and enforces lockout and the panic/decoy
//! escape hatch.
//!
//! Every `(state, event)` pair not listed in the transition table is a
//! silent no-op, never an error: out-of-order or duplicate events from
//! a jittery UI layer must not crash the ritual. Dispatch is
//! synchronous and total; the host guarantees non-interleaved dispatch
//! per instance (one dispatch queue), as the machine carries no
//! internal locking.
//!
//! Timers are deadlines recorded on state entry and cleared on every
//! transition away; [`DoormanStateMachine::tick`] fires the deadline of
//! the *current* state only, so a stale timer from a previous state can
//! never corrupt a later, unrelated one.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capability::CapabilityToken;
use crate::challenge::Challenge;
use crate::clock::Clock;
use crate::config::{DoormanConfig, PanicAction};

/// The doorman's control-plane state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoormanState {
    /// Waiting for a knock.
    Idle,
    /// A challenge is outstanding.
    Challenged,
    /// A gesture is being verified.
    Verifying,
    /// Admission granted; a capability is live.
    Admitted,
    /// Backpressure after a non-final failure.
    Cooldown,
    /// Locked out after repeated failures (or panic lockdown).
    Locked,
    /// Fake admission under the panic gesture; no real capability.
    Decoy,
}

/// Events the doorman reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum DoormanEvent {
    /// The entry knock was detected.
    KnockDetected,
    /// A gesture capture completed.
    GestureComplete,
    /// The outstanding challenge timed out.
    ChallengeTimeout,
    /// Verification passed; carries the freshly minted capability.
    VerificationSucceeded {
        /// The capability to hold while admitted.
        capability: CapabilityToken,
    },
    /// Verification failed.
    VerificationFailed,
    /// The post-failure cooldown elapsed.
    CooldownElapsed,
    /// The lockout period ended.
    LockExpired,
    /// The admission (or decoy) window elapsed.
    AdmissionTimeout,
    /// The user left the privileged mode.
    ExitRequested,
    /// The panic gesture was recognized.
    PanicGesture,
}

/// Read-only snapshot of the doorman's state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoormanSnapshot {
    /// Current control-plane state.
    pub state: DoormanState,
    /// Consecutive verification failures since the last success or
    /// served lockout.
    pub consecutive_failures: u32,
    /// Outstanding challenge; non-null only in `Challenged`/`Verifying`.
    pub challenge: Option<Challenge>,
    /// Live capability; non-null only in `Admitted`.
    pub capability: Option<CapabilityToken>,
    /// When the current lockout ends, if locked.
    pub lock_ends_at: Option<u64>,
    /// When the current admission (or decoy) window ends.
    pub admission_ends_at: Option<u64>,
    /// When the current cooldown ends, if cooling down.
    pub cooldown_ends_at: Option<u64>,
}

impl DoormanSnapshot {
    fn idle() -> Self {
        Self {
            state: DoormanState::Idle,
            consecutive_failures: 0,
            challenge: None,
            capability: None,
            lock_ends_at: None,
            admission_ends_at: None,
            cooldown_ends_at: None,
        }
    }
}

/// The doorman state machine over an injected clock.
pub struct DoormanStateMachine<C> {
    snapshot: DoormanSnapshot,
    config: DoormanConfig,
    clock: C,
}

impl<C: Clock> DoormanStateMachine<C> {
    /// Create a machine in `Idle` with the given config and clock.
    pub fn new(config: DoormanConfig, clock: C) -> Self {
        Self {
            snapshot: DoormanSnapshot::idle(),
            config,
            clock,
        }
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> &DoormanSnapshot {
        &self.snapshot
    }

    /// Current configuration.
    pub fn config(&self) -> &DoormanConfig {
        &self.config
    }

    /// Replace the configuration at runtime.
    ///
    /// Takes effect from the next transition; deadlines already armed
    /// keep their original expiry.
    pub fn set_config(&mut self, config: DoormanConfig) {
        self.config = config;
    }

    /// Dispatch one event through the transition table.
    ///
    /// Unlisted `(state, event)` pairs leave the state unchanged.
    pub fn dispatch(&mut self, event: DoormanEvent) -> &DoormanSnapshot {
        use DoormanEvent as E;
        use DoormanState as S;

        let now = self.clock.now_ms();
        let state = self.snapshot.state;
        match (state, event) {
            (S::Idle, E::KnockDetected) => {
                let challenge = Challenge::issue(now, self.config.challenge_ttl_ms);
                debug!(expires_at = challenge.expires_at, "challenge issued");
                self.snapshot.challenge = Some(challenge);
                self.enter(S::Challenged);
            }

            (S::Challenged, E::GestureComplete) => {
                let expired = self
                    .snapshot
                    .challenge
                    .as_ref()
                    .is_some_and(|c| c.is_expired(now));
                if expired {
                    // Rejected silently; the challenge stays until its
                    // timeout fires.
                    debug!("gesture arrived after challenge expiry, ignored");
                } else {
                    self.enter(S::Verifying);
                }
            }

            (S::Challenged, E::ChallengeTimeout) => {
                // The user simply didn't act: no failure increment.
                self.snapshot.challenge = None;
                self.enter(S::Idle);
            }

            (S::Verifying, E::VerificationSucceeded { capability }) => {
                self.snapshot.challenge = None;
                self.snapshot.consecutive_failures = 0;
                self.snapshot.admission_ends_at =
                    Some(now.saturating_add(self.config.admission_ttl_ms));
                self.snapshot.capability = Some(capability);
                self.enter(S::Admitted);
            }

            (S::Verifying, E::VerificationFailed) => {
                self.snapshot.challenge = None;
                self.snapshot.consecutive_failures += 1;
                if self.snapshot.consecutive_failures >= self.config.max_consecutive_failures {
                    self.snapshot.lock_ends_at =
                        Some(now.saturating_add(self.config.lock_duration_ms));
                    warn!(
                        failures = self.snapshot.consecutive_failures,
                        "failure threshold reached, locking"
                    );
                    self.enter(S::Locked);
                } else {
                    self.snapshot.cooldown_ends_at =
                        Some(now.saturating_add(self.config.cooldown_ms));
                    self.enter(S::Cooldown);
                }
            }

            (S::Cooldown, E::CooldownElapsed) => {
                self.snapshot.cooldown_ends_at = None;
                self.enter(S::Idle);
            }

            (S::Locked, E::LockExpired) => {
                // Clean slate after serving a lock.
                self.snapshot.lock_ends_at = None;
                self.snapshot.consecutive_failures = 0;
                self.enter(S::Idle);
            }

            (S::Admitted, E::ExitRequested) | (S::Admitted, E::AdmissionTimeout) => {
                self.snapshot.capability = None;
                self.snapshot.admission_ends_at = None;
                self.enter(S::Idle);
            }

            (S::Challenged, E::PanicGesture) | (S::Verifying, E::PanicGesture) => {
                if !self.config.panic_gesture_enabled {
                    return &self.snapshot;
                }
                self.snapshot.challenge = None;
                match self.config.panic_action {
                    PanicAction::Decoy => {
                        // Appears to succeed; admits nothing.
                        self.snapshot.admission_ends_at =
                            Some(now.saturating_add(self.config.decoy_ttl_ms));
                        warn!("panic gesture: entering decoy");
                        self.enter(S::Decoy);
                    }
                    PanicAction::Lockdown => {
                        let duration = self
                            .config
                            .lock_duration_ms
                            .saturating_mul(u64::from(self.config.panic_lock_multiplier));
                        self.snapshot.lock_ends_at = Some(now.saturating_add(duration));
                        warn!(duration_ms = duration, "panic gesture: locking down");
                        self.enter(S::Locked);
                    }
                }
            }

            (S::Decoy, E::AdmissionTimeout) | (S::Decoy, E::ExitRequested) => {
                self.snapshot.admission_ends_at = None;
                self.enter(S::Idle);
            }

            // Everything else, including a knock while locked, is a
            // deliberate no-op.
            _ => {}
        }
        &self.snapshot
    }

    /// Fire the current state's deadline if it has passed.
    ///
    /// Returns the synthesized event, if one fired. Hosts call this on
    /// their own cadence (UI frame, timer wheel); tests drive it with a
    /// manual clock.
    pub fn tick(&mut self) -> Option<DoormanEvent> {
        use DoormanState as S;

        let now = self.clock.now_ms();
        let event = match self.snapshot.state {
            S::Challenged => self
                .snapshot
                .challenge
                .as_ref()
                .filter(|c| c.is_expired(now))
                .map(|_| DoormanEvent::ChallengeTimeout),
            S::Cooldown => self
                .snapshot
                .cooldown_ends_at
                .filter(|&t| now >= t)
                .map(|_| DoormanEvent::CooldownElapsed),
            S::Locked => self
                .snapshot
                .lock_ends_at
                .filter(|&t| now >= t)
                .map(|_| DoormanEvent::LockExpired),
            S::Admitted | S::Decoy => self
                .snapshot
                .admission_ends_at
                .filter(|&t| now >= t)
                .map(|_| DoormanEvent::AdmissionTimeout),
            S::Idle | S::Verifying => None,
        };
        if let Some(event) = event.clone() {
            self.dispatch(event);
        }
        event
    }

    fn enter(&mut self, state: DoormanState) {
        debug!(from = ?self.snapshot.state, to = ?state, "doorman transition");
        self.snapshot.state = state;
        self.assert_invariants();
    }

    /// Invariants: capability only in Admitted, challenge only in
    /// Challenged/Verifying.
    fn assert_invariants(&self) {
        debug_assert!(
            self.snapshot.capability.is_none() || self.snapshot.state == DoormanState::Admitted
        );
        debug_assert!(
            self.snapshot.challenge.is_none()
                || matches!(
                    self.snapshot.state,
                    DoormanState::Challenged | DoormanState::Verifying
                )
        );
    }
}
