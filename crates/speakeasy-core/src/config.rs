//! Doorman configuration.
//!
//! Externally supplied and mutable at runtime via
//! [`crate::DoormanStateMachine::set_config`]; never baked into the
//! state type. Durations are milliseconds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use speakeasy_gesture::{bucket_hold_duration, GestureSequence, GestureStep};

/// Default failure threshold before lockout.
const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Default lockout duration (5 minutes).
const DEFAULT_LOCK_DURATION_MS: u64 = 5 * 60 * 1000;

/// Default cooldown after a single failure (3 seconds).
const DEFAULT_COOLDOWN_MS: u64 = 3 * 1000;

/// Default challenge lifetime (30 seconds).
const DEFAULT_CHALLENGE_TTL_MS: u64 = 30 * 1000;

/// Default admission lifetime (5 minutes).
const DEFAULT_ADMISSION_TTL_MS: u64 = 5 * 60 * 1000;

/// Default decoy-admission lifetime (1 minute).
const DEFAULT_DECOY_TTL_MS: u64 = 60 * 1000;

/// Default panic lock multiplier.
const DEFAULT_PANIC_LOCK_MULTIPLIER: u32 = 4;

/// What the panic gesture does when triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanicAction {
    /// Enter the decoy state: appear to succeed, admit nothing.
    Decoy,
    /// Lock immediately for `lock_duration_ms * panic_lock_multiplier`.
    Lockdown,
}

/// The configured panic pattern.
///
/// Matched by shape, independent of the main derivation path, so a
/// user under duress never has to produce a correct credential to
/// trigger it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicPattern {
    /// Required tap-burst count.
    pub tap_count: u32,
    /// Required hold duration after bucketing, in milliseconds.
    pub hold_bucket_ms: u64,
}

impl PanicPattern {
    /// Whether a sequence matches this pattern.
    ///
    /// A match requires a tap burst with the configured count and,
    /// somewhere after it, a hold whose bucketed duration equals the
    /// configured bucket.
    pub fn matches(&self, sequence: &GestureSequence) -> bool {
        let mut saw_tap = false;
        for step in &sequence.steps {
            match step {
                GestureStep::Tap { count, .. } if *count == self.tap_count => {
                    saw_tap = true;
                }
                GestureStep::Hold { duration_ms, .. }
                    if saw_tap && bucket_hold_duration(*duration_ms) == self.hold_bucket_ms =>
                {
                    return true;
                }
                _ => {}
            }
        }
        false
    }
}

/// Predicate the orchestrator evaluates before normal verification.
pub fn is_panic_gesture(sequence: &GestureSequence, pattern: &PanicPattern) -> bool {
    pattern.matches(sequence)
}

/// Runtime configuration for the doorman.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DoormanConfig {
    /// Consecutive failures that escalate to lockout.
    pub max_consecutive_failures: u32,
    /// Lockout duration in milliseconds.
    pub lock_duration_ms: u64,
    /// Cooldown duration after a non-final failure, in milliseconds.
    pub cooldown_ms: u64,
    /// Challenge lifetime in milliseconds.
    pub challenge_ttl_ms: u64,
    /// Admission lifetime in milliseconds.
    pub admission_ttl_ms: u64,
    /// Decoy-admission lifetime in milliseconds.
    pub decoy_ttl_ms: u64,
    /// Lock-duration multiplier applied on a panic lockdown.
    pub panic_lock_multiplier: u32,
    /// Whether the panic gesture is armed.
    pub panic_gesture_enabled: bool,
    /// What the panic gesture does.
    pub panic_action: PanicAction,
    /// The pattern that triggers the panic path.
    pub panic_pattern: Option<PanicPattern>,
}

impl Default for DoormanConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            lock_duration_ms: DEFAULT_LOCK_DURATION_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            challenge_ttl_ms: DEFAULT_CHALLENGE_TTL_MS,
            admission_ttl_ms: DEFAULT_ADMISSION_TTL_MS,
            decoy_ttl_ms: DEFAULT_DECOY_TTL_MS,
            panic_lock_multiplier: DEFAULT_PANIC_LOCK_MULTIPLIER,
            panic_gesture_enabled: false,
            panic_action: PanicAction::Decoy,
            panic_pattern: None,
        }
    }
}

/// Errors in doorman configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration field has an invalid value.
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field path.
        field: String,
        /// Reason for invalidity.
        reason: String,
    },
}

impl DoormanConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_consecutive_failures".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.lock_duration_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lock_duration_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.challenge_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "challenge_ttl_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.admission_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "admission_ttl_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.decoy_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "decoy_ttl_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.panic_lock_multiplier == 0 {
            return Err(ConfigError::InvalidValue {
                field: "panic_lock_multiplier".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.panic_gesture_enabled && self.panic_pattern.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "panic_pattern".into(),
                reason: "required when panic_gesture_enabled is set".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speakeasy_gesture::Region;

    fn sequence_of(steps: Vec<GestureStep>) -> GestureSequence {
        GestureSequence {
            steps,
            total_duration_ms: 1_000,
            rhythm_hash: "r".into(),
            captured_at: 1_750_000_000_000,
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(DoormanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = DoormanConfig {
            max_consecutive_failures: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_lock_duration_rejected() {
        let config = DoormanConfig {
            lock_duration_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_panic_enabled_requires_pattern() {
        let config = DoormanConfig {
            panic_gesture_enabled: true,
            panic_pattern: None,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DoormanConfig {
            panic_gesture_enabled: true,
            panic_pattern: Some(PanicPattern {
                tap_count: 5,
                hold_bucket_ms: 1_000,
            }),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_panic_pattern_matches_tap_then_hold() {
        let pattern = PanicPattern {
            tap_count: 5,
            hold_bucket_ms: 1_000,
        };
        let seq = sequence_of(vec![
            GestureStep::Tap {
                count: 5,
                region: Region::Center,
            },
            GestureStep::Hold {
                duration_ms: 1_010, // buckets to 1000
                region: Region::Center,
            },
        ]);
        assert!(is_panic_gesture(&seq, &pattern));
    }

    #[test]
    fn test_panic_pattern_requires_order() {
        let pattern = PanicPattern {
            tap_count: 5,
            hold_bucket_ms: 1_000,
        };
        let seq = sequence_of(vec![
            GestureStep::Hold {
                duration_ms: 1_000,
                region: Region::Center,
            },
            GestureStep::Tap {
                count: 5,
                region: Region::Center,
            },
        ]);
        assert!(!is_panic_gesture(&seq, &pattern));
    }

    #[test]
    fn test_panic_pattern_rejects_wrong_count() {
        let pattern = PanicPattern {
            tap_count: 5,
            hold_bucket_ms: 1_000,
        };
        let seq = sequence_of(vec![
            GestureStep::Tap {
                count: 4,
                region: Region::Center,
            },
            GestureStep::Hold {
                duration_ms: 1_000,
                region: Region::Center,
            },
        ]);
        assert!(!is_panic_gesture(&seq, &pattern));
    }

    #[test]
    fn test_panic_pattern_rejects_wrong_bucket() {
        let pattern = PanicPattern {
            tap_count: 5,
            hold_bucket_ms: 1_000,
        };
        let seq = sequence_of(vec![
            GestureStep::Tap {
                count: 5,
                region: Region::Center,
            },
            GestureStep::Hold {
                duration_ms: 700,
                region: Region::Center,
            },
        ]);
        assert!(!is_panic_gesture(&seq, &pattern));
    }
}
