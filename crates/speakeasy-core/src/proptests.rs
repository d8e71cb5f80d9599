//! Property-based tests for the protocol core.
//!
//! These pin the invariants the doorman depends on:
//!
//! - Challenge responses are deterministic per (gesture, challenge) and
//!   change when either varies
//! - Capability verification rejects any single-field tamper
//! - The state machine never holds a capability outside `Admitted` or a
//!   challenge outside `Challenged`/`Verifying`, for any event stream

use proptest::prelude::*;
use std::sync::Arc;

use speakeasy_crypto::DeviceSecret;
use speakeasy_gesture::{GestureSequence, GestureStep, Region};
use speakeasy_store::MemoryVerifierStore;

use crate::auth::SpeakeasyAuth;
use crate::capability::{
    create_capability_token, verify_capability_token, CapabilityRequest, CapabilityToken,
};
use crate::challenge::Challenge;
use crate::clock::ManualClock;
use crate::config::DoormanConfig;
use crate::machine::{DoormanEvent, DoormanState, DoormanStateMachine};

fn arb_sequence() -> impl Strategy<Value = GestureSequence> {
    (1u32..8, 0u64..4_000, "[a-z0-9]{1,12}").prop_map(|(count, duration_ms, rhythm_hash)| {
        GestureSequence {
            steps: vec![
                GestureStep::Tap {
                    count,
                    region: Region::Center,
                },
                GestureStep::Hold {
                    duration_ms,
                    region: Region::North,
                },
            ],
            total_duration_ms: duration_ms + 500,
            rhythm_hash,
            captured_at: 1_750_000_000_000,
        }
    })
}

fn arb_event() -> impl Strategy<Value = DoormanEvent> {
    prop_oneof![
        Just(DoormanEvent::KnockDetected),
        Just(DoormanEvent::GestureComplete),
        Just(DoormanEvent::ChallengeTimeout),
        Just(DoormanEvent::VerificationSucceeded {
            capability: arb_token(),
        }),
        Just(DoormanEvent::VerificationFailed),
        Just(DoormanEvent::CooldownElapsed),
        Just(DoormanEvent::LockExpired),
        Just(DoormanEvent::AdmissionTimeout),
        Just(DoormanEvent::ExitRequested),
        Just(DoormanEvent::PanicGesture),
    ]
}

fn arb_token() -> CapabilityToken {
    create_capability_token(CapabilityRequest {
        verifier_key_hex: &"cd".repeat(32),
        issuer: "proptest",
        scopes: vec!["privileged".into()],
        ttl_ms: 60_000,
        now_ms: 1_000,
    })
    .expect("fixed request mints")
}

fn auth_with(sequence: &GestureSequence) -> SpeakeasyAuth<MemoryVerifierStore, Arc<ManualClock>> {
    let auth = SpeakeasyAuth::with_clock(
        MemoryVerifierStore::new(),
        "prop.local",
        DeviceSecret::from_bytes(vec![9; 32]).expect("non-empty secret"),
        ManualClock::at(1_000),
    )
    .expect("valid construction");
    auth.register_gesture(sequence).expect("registration");
    auth
}

proptest! {
    /// The same gesture and challenge always produce the same response.
    #[test]
    fn response_deterministic(seq in arb_sequence()) {
        let auth = auth_with(&seq);
        let challenge = Challenge::issue(1_000, 30_000);
        let r1 = auth.compute_response(&seq, &challenge).expect("response");
        let r2 = auth.compute_response(&seq, &challenge).expect("response");
        prop_assert_eq!(r1, r2);
    }

    /// Distinct challenges never repeat a response.
    #[test]
    fn response_bound_to_challenge(seq in arb_sequence()) {
        let auth = auth_with(&seq);
        let r1 = auth
            .compute_response(&seq, &Challenge::issue(1_000, 30_000))
            .expect("response");
        let r2 = auth
            .compute_response(&seq, &Challenge::issue(1_000, 30_000))
            .expect("response");
        prop_assert_ne!(r1, r2);
    }

    /// The registered gesture always verifies against a fresh challenge.
    #[test]
    fn registered_gesture_always_passes(seq in arb_sequence()) {
        let auth = auth_with(&seq);
        let verdict = auth
            .verify_gesture(&seq, &Challenge::issue(1_000, 30_000))
            .expect("verify");
        prop_assert!(verdict.is_pass());
    }

    /// Any single-field tamper invalidates a token's signature.
    #[test]
    fn token_tamper_detected(field in 0usize..5, ttl in 1u64..1_000_000) {
        let key_hex = "ef".repeat(32);
        let mut token = create_capability_token(CapabilityRequest {
            verifier_key_hex: &key_hex,
            issuer: "proptest",
            scopes: vec!["privileged".into()],
            ttl_ms: ttl,
            now_ms: 1_000,
        })
        .expect("mint");

        match field {
            0 => token.token_id.push('0'),
            1 => token.issuer.push('x'),
            2 => token.scopes.push("admin".into()),
            3 => token.not_before += 1,
            _ => token.expires_at += 1,
        }
        prop_assert!(!verify_capability_token(&token, &key_hex, 1_000).expect("verify"));
    }

    /// Tokens verify exactly within [not_before, expires_at).
    #[test]
    fn token_window_half_open(ttl in 1u64..1_000_000, offset in 0u64..2_000_000) {
        let key_hex = "ef".repeat(32);
        let token = create_capability_token(CapabilityRequest {
            verifier_key_hex: &key_hex,
            issuer: "proptest",
            scopes: vec!["privileged".into()],
            ttl_ms: ttl,
            now_ms: 1_000,
        })
        .expect("mint");
        let now = offset;
        let valid = verify_capability_token(&token, &key_hex, now).expect("verify");
        prop_assert_eq!(valid, now >= token.not_before && now < token.expires_at);
    }

    /// For any event stream, a capability exists only in `Admitted` and
    /// a challenge only in `Challenged`/`Verifying`.
    #[test]
    fn machine_invariants_hold(events in prop::collection::vec(arb_event(), 0..40)) {
        let clock = ManualClock::at(1_000_000);
        let mut machine = DoormanStateMachine::new(DoormanConfig::default(), clock);
        for event in events {
            let snap = machine.dispatch(event);
            prop_assert!(snap.capability.is_none() || snap.state == DoormanState::Admitted);
            prop_assert!(
                snap.challenge.is_none()
                    || matches!(snap.state, DoormanState::Challenged | DoormanState::Verifying)
            );
        }
    }

    /// Failure counting never exceeds the threshold before locking.
    #[test]
    fn failures_never_exceed_threshold(events in prop::collection::vec(arb_event(), 0..60)) {
        let clock = ManualClock::at(1_000_000);
        let config = DoormanConfig::default();
        let max = config.max_consecutive_failures;
        let mut machine = DoormanStateMachine::new(config, clock);
        for event in events {
            let snap = machine.dispatch(event);
            prop_assert!(snap.consecutive_failures <= max);
            if snap.consecutive_failures == max {
                prop_assert_eq!(snap.state, DoormanState::Locked);
            }
        }
    }
}
