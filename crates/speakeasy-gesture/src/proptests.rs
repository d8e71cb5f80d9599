//! Property-based tests for the canonicalizer.
//!
//! These verify the invariants the derivation layer depends on:
//!
//! - Canonicalization is deterministic
//! - Hold bucketing is stable within a bucket and never strays more
//!   than half a bucket from the raw duration
//! - Step order is preserved
//! - Timing metadata never influences the canonical string

use proptest::prelude::*;

use crate::canonical::{canonicalize, HOLD_BUCKET_MS};
use crate::sequence::{FlickDirection, GestureSequence, GestureStep, Region};

fn arb_region() -> impl Strategy<Value = Region> {
    prop_oneof![
        Just(Region::Center),
        Just(Region::North),
        Just(Region::East),
        Just(Region::South),
        Just(Region::West),
    ]
}

fn arb_direction() -> impl Strategy<Value = FlickDirection> {
    prop_oneof![
        Just(FlickDirection::Up),
        Just(FlickDirection::Down),
        Just(FlickDirection::Left),
        Just(FlickDirection::Right),
    ]
}

fn arb_step() -> impl Strategy<Value = GestureStep> {
    prop_oneof![
        (1u32..10, arb_region()).prop_map(|(count, region)| GestureStep::Tap { count, region }),
        (0u64..5_000, arb_region())
            .prop_map(|(duration_ms, region)| GestureStep::Hold { duration_ms, region }),
        (0.0f64..360.0, 0.0f64..360.0, 0u32..12).prop_map(|(from_angle, to_angle, notches)| {
            GestureStep::RadialDrag {
                from_angle,
                to_angle,
                notches,
            }
        }),
        (arb_direction(), 0.0f64..10.0).prop_map(|(direction, velocity)| GestureStep::Flick {
            direction,
            velocity
        }),
    ]
}

fn arb_sequence() -> impl Strategy<Value = GestureSequence> {
    (prop::collection::vec(arb_step(), 0..8), 0u64..60_000, "[a-z0-9]{0,16}").prop_map(
        |(steps, total_duration_ms, rhythm_hash)| GestureSequence {
            steps,
            total_duration_ms,
            rhythm_hash,
            captured_at: 1_750_000_000_000,
        },
    )
}

proptest! {
    /// Canonicalization is a pure function of the steps.
    #[test]
    fn canonicalize_deterministic(seq in arb_sequence()) {
        prop_assert_eq!(canonicalize(&seq), canonicalize(&seq));
    }

    /// One canonical segment per step, in order.
    #[test]
    fn one_segment_per_step(seq in arb_sequence()) {
        let canonical = canonicalize(&seq);
        if seq.steps.is_empty() {
            prop_assert_eq!(canonical, "");
        } else {
            prop_assert_eq!(canonical.split('|').count(), seq.steps.len());
        }
    }

    /// Bucketed hold durations never drift more than half a bucket.
    #[test]
    fn hold_bucket_within_half_width(duration_ms in 0u64..100_000, region in arb_region()) {
        let seq = GestureSequence {
            steps: vec![GestureStep::Hold { duration_ms, region }],
            total_duration_ms: duration_ms,
            rhythm_hash: String::new(),
            captured_at: 1_750_000_000_000,
        };
        let canonical = canonicalize(&seq);
        let bucketed: u64 = canonical
            .split(':')
            .nth(1)
            .expect("hold segment has a duration field")
            .parse()
            .expect("bucketed duration is an integer");
        prop_assert_eq!(bucketed % HOLD_BUCKET_MS, 0);
        prop_assert!(bucketed.abs_diff(duration_ms) <= HOLD_BUCKET_MS / 2);
    }

    /// Timing metadata is excluded from the canonical string.
    #[test]
    fn timing_metadata_excluded(
        seq in arb_sequence(),
        rhythm in "[a-z0-9]{0,16}",
        duration in 0u64..60_000,
    ) {
        let mut other = seq.clone();
        other.rhythm_hash = rhythm;
        other.total_duration_ms = duration;
        other.captured_at = seq.captured_at + 1;
        prop_assert_eq!(canonicalize(&seq), canonicalize(&other));
    }
}
