//! Solver configuration.

use cf_core::units::{Accel, Length, Time, constants, m, s};

use crate::error::{SolverError, SolverResult};

/// Early-stop rule for runaway iterations.
///
/// The solve is reported as diverged once the maximum level change has grown
/// for `window` consecutive iterations while staying above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergencePolicy {
    pub enabled: bool,
    /// Consecutive growing iterations that trigger divergence
    pub window: usize,
    /// Deltas at or below this never count as growth
    pub threshold: Length,
}

impl Default for DivergencePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            window: 5,
            threshold: m(0.05),
        }
    }
}

impl DivergencePolicy {
    /// Never stop early; only the iteration budget ends a non-converging solve.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Relaxation solver configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Convergence threshold on the largest level change of one iteration
    pub tolerance: Length,
    /// Maximum iterations
    pub max_iterations: usize,
    /// Relaxation step converting imbalance into level change (tuning constant, not wall-clock time)
    pub dt_relax: Time,
    /// Gravitational acceleration for the gate discharge relation
    pub gravity: Accel,
    pub divergence: DivergencePolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: m(1e-3),
            max_iterations: 100,
            dt_relax: s(60.0),
            gravity: constants::g(),
            divergence: DivergencePolicy::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_tolerance(mut self, tolerance: Length) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_dt_relax(mut self, dt_relax: Time) -> Self {
        self.dt_relax = dt_relax;
        self
    }

    pub fn with_divergence(mut self, divergence: DivergencePolicy) -> Self {
        self.divergence = divergence;
        self
    }

    /// Check every setting is usable.
    pub fn validate(&self) -> SolverResult<()> {
        positive(self.tolerance.value, "tolerance")?;
        positive(self.dt_relax.value, "dt_relax")?;
        positive(self.gravity.value, "gravity")?;
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidSetting {
                parameter: "max_iterations",
                value: 0.0,
                expected: ">= 1",
            });
        }
        if self.divergence.enabled {
            if self.divergence.window == 0 {
                return Err(SolverError::InvalidSetting {
                    parameter: "divergence.window",
                    value: 0.0,
                    expected: ">= 1",
                });
            }
            let t = self.divergence.threshold.value;
            if !t.is_finite() || t < 0.0 {
                return Err(SolverError::InvalidSetting {
                    parameter: "divergence.threshold",
                    value: t,
                    expected: ">= 0",
                });
            }
        }
        Ok(())
    }
}

fn positive(value: f64, parameter: &'static str) -> SolverResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SolverError::InvalidSetting {
            parameter,
            value,
            expected: "> 0",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SolverConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.tolerance.value, 1e-3);
        assert_eq!(cfg.dt_relax.value, 60.0);
        assert!(cfg.divergence.enabled);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let cfg = SolverConfig::default().with_max_iterations(0);
        assert!(matches!(
            cfg.validate(),
            Err(SolverError::InvalidSetting {
                parameter: "max_iterations",
                ..
            })
        ));

        let cfg = SolverConfig::default().with_dt_relax(s(-1.0));
        assert!(cfg.validate().is_err());

        let cfg = SolverConfig::default().with_tolerance(m(f64::NAN));
        assert!(cfg.validate().is_err());

        let cfg = SolverConfig::default().with_divergence(DivergencePolicy {
            window: 0,
            ..DivergencePolicy::default()
        });
        assert!(cfg.validate().is_err());

        // A disabled policy is not checked.
        let cfg = SolverConfig::default().with_divergence(DivergencePolicy {
            window: 0,
            ..DivergencePolicy::disabled()
        });
        assert!(cfg.validate().is_ok());
    }
}
