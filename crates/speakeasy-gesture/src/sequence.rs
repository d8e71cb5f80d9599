//! Gesture step and sequence types.
//!
//! These shapes are produced by an external capture layer and are
//! ephemeral: a sequence exists only for the duration of one
//! registration or verification call and is never persisted.

use serde::{Deserialize, Serialize};

/// A region of the ritual pad that a step targets.
///
/// Closed vocabulary: the capture layer maps raw coordinates onto one
/// of these before handing the step to this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// Center of the pad.
    Center,
    /// Top edge.
    North,
    /// Right edge.
    East,
    /// Bottom edge.
    South,
    /// Left edge.
    West,
}

impl Region {
    /// Canonical lowercase name used in derivation input.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Center => "center",
            Region::North => "north",
            Region::East => "east",
            Region::South => "south",
            Region::West => "west",
        }
    }
}

/// Direction of a flick step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlickDirection {
    /// Upward flick.
    Up,
    /// Downward flick.
    Down,
    /// Leftward flick.
    Left,
    /// Rightward flick.
    Right,
}

impl FlickDirection {
    /// Canonical lowercase name used in derivation input.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlickDirection::Up => "up",
            FlickDirection::Down => "down",
            FlickDirection::Left => "left",
            FlickDirection::Right => "right",
        }
    }
}

/// One step of a gesture ritual.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GestureStep {
    /// A burst of taps on one region.
    Tap {
        /// Number of taps in the burst.
        count: u32,
        /// Region tapped.
        region: Region,
    },
    /// A press held for a duration.
    Hold {
        /// Raw hold duration in milliseconds (bucketed at canonicalization).
        duration_ms: u64,
        /// Region held.
        region: Region,
    },
    /// A drag along the pad's outer ring.
    RadialDrag {
        /// Starting angle in degrees.
        from_angle: f64,
        /// Ending angle in degrees.
        to_angle: f64,
        /// Number of detent notches crossed.
        notches: u32,
    },
    /// A quick directional swipe.
    Flick {
        /// Direction of travel.
        direction: FlickDirection,
        /// Release velocity in pad-widths per second.
        velocity: f64,
    },
}

/// One complete captured ritual.
///
/// `rhythm_hash` is an opaque timing fingerprint supplied by the
/// capture layer. It is mixed into the challenge-response message but
/// never into the stored verifier; [`crate::canonicalize`] ignores it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureSequence {
    /// Ordered steps of the ritual.
    pub steps: Vec<GestureStep>,
    /// Total capture duration in milliseconds.
    pub total_duration_ms: u64,
    /// Opaque timing fingerprint from the capture layer.
    pub rhythm_hash: String,
    /// Capture timestamp, Unix milliseconds.
    pub captured_at: u64,
}
