//! Deterministic, jitter-tolerant gesture canonicalization.
//!
//! Turns a [`GestureSequence`] into exactly one canonical string so the
//! same ritual by the same user reproduces the same derivation input.
//! Order matters: steps are joined with `|` in capture order.
//!
//! Hold durations are bucketed to the nearest [`HOLD_BUCKET_MS`]
//! milliseconds. That is the system's entire jitter-tolerance
//! mechanism; widening the bucket trades security entropy for
//! usability, which is why it stays a single named constant.

use crate::sequence::{GestureSequence, GestureStep};

/// Hold-duration bucket width in milliseconds.
///
/// Durations round to the nearest multiple: 510 ms and 515 ms both
/// canonicalize to 500, while 540 ms canonicalizes to 550.
pub const HOLD_BUCKET_MS: u64 = 50;

/// Round a hold duration to the nearest multiple of [`HOLD_BUCKET_MS`].
pub fn bucket_hold_duration(duration_ms: u64) -> u64 {
    (duration_ms + HOLD_BUCKET_MS / 2) / HOLD_BUCKET_MS * HOLD_BUCKET_MS
}

/// Canonicalize one step.
fn canonicalize_step(step: &GestureStep) -> String {
    match step {
        GestureStep::Tap { count, region } => format!("tap:{}:{}", count, region.as_str()),
        GestureStep::Hold {
            duration_ms,
            region,
        } => format!(
            "hold:{}:{}",
            bucket_hold_duration(*duration_ms),
            region.as_str()
        ),
        GestureStep::RadialDrag {
            from_angle,
            to_angle,
            notches,
        } => format!(
            "radial:{}:{}:{}",
            from_angle.round() as i64,
            to_angle.round() as i64,
            notches
        ),
        GestureStep::Flick {
            direction,
            velocity,
        } => format!("flick:{}:{:.2}", direction.as_str(), velocity),
    }
}

/// Serialize a gesture sequence into its canonical comparison string.
///
/// Deterministic for identical inputs and independent of micro-timing
/// noise. The sequence's `rhythm_hash` and timestamps are deliberately
/// excluded: only step shapes reach the stored verifier.
pub fn canonicalize(sequence: &GestureSequence) -> String {
    sequence
        .steps
        .iter()
        .map(canonicalize_step)
        .collect::<Vec<_>>()
        .join("|")
}

/// Expose the canonical string for diagnostics and logging fingerprints.
///
/// Identical to [`canonicalize`]; kept as a named entry point so call
/// sites that only want a fingerprint do not look like key derivation.
pub fn fingerprint(sequence: &GestureSequence) -> String {
    canonicalize(sequence)
}
