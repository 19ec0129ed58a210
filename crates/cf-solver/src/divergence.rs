//! Detection of runaway relaxation.

use crate::config::DivergencePolicy;

/// Tracks consecutive growth of the per-iteration maximum level change.
#[derive(Debug, Clone)]
pub struct DivergenceMonitor {
    policy: DivergencePolicy,
    previous: Option<f64>,
    growing: usize,
}

impl DivergenceMonitor {
    pub fn new(policy: DivergencePolicy) -> Self {
        Self {
            policy,
            previous: None,
            growing: 0,
        }
    }

    /// Record one iteration's max delta. Returns true once the solve should be declared diverged.
    pub fn observe(&mut self, max_delta: f64) -> bool {
        if !max_delta.is_finite() {
            return true;
        }
        let grew = matches!(self.previous, Some(prev) if max_delta > prev)
            && max_delta > self.policy.threshold.value;
        self.growing = if grew { self.growing + 1 } else { 0 };
        self.previous = Some(max_delta);

        self.policy.enabled && self.growing >= self.policy.window
    }

    /// Current run of growing iterations.
    pub fn growing(&self) -> usize {
        self.growing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::units::m;

    fn policy(window: usize) -> DivergencePolicy {
        DivergencePolicy {
            enabled: true,
            window,
            threshold: m(0.05),
        }
    }

    #[test]
    fn trips_after_window_of_growth() {
        let mut monitor = DivergenceMonitor::new(policy(3));
        assert!(!monitor.observe(0.1));
        assert!(!monitor.observe(0.2));
        assert!(!monitor.observe(0.3));
        assert!(monitor.observe(0.4));
    }

    #[test]
    fn shrinking_resets_the_run() {
        let mut monitor = DivergenceMonitor::new(policy(3));
        monitor.observe(0.1);
        monitor.observe(0.2);
        monitor.observe(0.3);
        assert!(!monitor.observe(0.25));
        assert_eq!(monitor.growing(), 0);
        assert!(!monitor.observe(0.3));
    }

    #[test]
    fn small_deltas_never_count() {
        let mut monitor = DivergenceMonitor::new(policy(2));
        for d in [0.001, 0.002, 0.004, 0.008, 0.016, 0.032] {
            assert!(!monitor.observe(d));
        }
    }

    #[test]
    fn disabled_policy_only_reacts_to_non_finite() {
        let mut monitor = DivergenceMonitor::new(DivergencePolicy::disabled());
        for d in [1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0] {
            assert!(!monitor.observe(d));
        }
        assert!(monitor.observe(f64::INFINITY));
    }
}
