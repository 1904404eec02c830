//! Accessor configuration, validation, and error types.
//!
//! [`AccessorConfig`] holds the numeric knobs the
//! [`StateAccessor`](crate::StateAccessor) uses to derive canonical
//! quantities from raw solver data. Observation functions validate their
//! config once at construction.

use std::error::Error;
use std::fmt;

use bough_core::ObsError;

// ── AccessorConfig ─────────────────────────────────────────────────

/// Tolerances and limits used when deriving features.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessorConfig {
    /// Absolute tolerance for tightness, bound and integrality checks.
    /// Default: 1e-6.
    pub feasibility_tol: f64,
    /// Floor applied to each directional gain in product scores.
    /// Default: 1e-6.
    pub score_epsilon: f64,
    /// Offset added to the LP count when scaling ages. Default: 5.0.
    pub age_offset: f64,
    /// Strong-branching attempts per candidate before giving up. Default: 2.
    pub max_probe_attempts: u32,
    /// Gain credited to a branching direction proven infeasible.
    /// Default: 1e20.
    pub infeasible_gain: f64,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            feasibility_tol: 1e-6,
            score_epsilon: 1e-6,
            age_offset: 5.0,
            max_probe_attempts: 2,
            infeasible_gain: 1e20,
        }
    }
}

impl AccessorConfig {
    /// Check every invariant of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.feasibility_tol.is_finite() && self.feasibility_tol >= 0.0) {
            return Err(ConfigError::InvalidTolerance {
                name: "feasibility_tol",
                value: self.feasibility_tol,
            });
        }
        if !(self.score_epsilon.is_finite() && self.score_epsilon > 0.0) {
            return Err(ConfigError::InvalidTolerance {
                name: "score_epsilon",
                value: self.score_epsilon,
            });
        }
        if !(self.age_offset.is_finite() && self.age_offset > 0.0) {
            return Err(ConfigError::InvalidAgeOffset {
                value: self.age_offset,
            });
        }
        if self.max_probe_attempts == 0 {
            return Err(ConfigError::ZeroProbeAttempts);
        }
        if !(self.infeasible_gain.is_finite() && self.infeasible_gain > 0.0) {
            return Err(ConfigError::InvalidInfeasibleGain {
                value: self.infeasible_gain,
            });
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`AccessorConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A tolerance is NaN, infinite, or out of range.
    InvalidTolerance {
        /// Name of the offending field.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// `age_offset` must be finite and positive.
    InvalidAgeOffset {
        /// The invalid value.
        value: f64,
    },
    /// `max_probe_attempts` is zero; every candidate needs one attempt.
    ZeroProbeAttempts,
    /// `infeasible_gain` must be finite and positive.
    InvalidInfeasibleGain {
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTolerance { name, value } => {
                write!(f, "{name} must be finite and in range, got {value}")
            }
            Self::InvalidAgeOffset { value } => {
                write!(f, "age_offset must be finite and positive, got {value}")
            }
            Self::ZeroProbeAttempts => write!(f, "max_probe_attempts must be at least 1"),
            Self::InvalidInfeasibleGain { value } => {
                write!(f, "infeasible_gain must be finite and positive, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl From<ConfigError> for ObsError {
    fn from(e: ConfigError) -> Self {
        ObsError::InvalidConfig {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(AccessorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_nan_tolerance() {
        let cfg = AccessorConfig {
            feasibility_tol: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTolerance {
                name: "feasibility_tol",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_epsilon_and_attempts() {
        let cfg = AccessorConfig {
            score_epsilon: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AccessorConfig {
            max_probe_attempts: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroProbeAttempts));
    }

    #[test]
    fn rejects_bad_age_offset_and_gain() {
        let cfg = AccessorConfig {
            age_offset: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidAgeOffset { .. })
        ));

        let cfg = AccessorConfig {
            infeasible_gain: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidInfeasibleGain { .. })
        ));
    }

    #[test]
    fn converts_into_obs_error() {
        let e: ObsError = ConfigError::ZeroProbeAttempts.into();
        assert!(matches!(e, ObsError::InvalidConfig { .. }));
    }
}
