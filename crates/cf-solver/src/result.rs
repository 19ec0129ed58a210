//! Solve outcome.

use std::fmt;

use cf_core::units::{Length, VolumeRate};
use cf_core::{GateId, NodeId};

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Largest level change fell below tolerance
    Converged,
    /// Level changes kept growing, or a level became non-finite
    Diverged,
    /// Iteration budget ran out first
    MaxIterationsExceeded,
    /// Stopped by a cancel token or deadline
    Cancelled,
}

impl SolveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Converged => "converged",
            SolveStatus::Diverged => "diverged",
            SolveStatus::MaxIterationsExceeded => "max_iterations_exceeded",
            SolveStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_converged(self) -> bool {
        self == SolveStatus::Converged
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Levels, flows and diagnostics of a finished solve.
///
/// Returned for every status; when the solve did not converge the values are
/// the last committed snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// Level per node, indexed by node slot
    pub levels: Vec<Length>,
    /// Flow per gate, indexed by gate slot (positive = upstream to downstream)
    pub flows: Vec<VolumeRate>,
    /// Net inflow per node, evaluated with the same snapshot as `flows`
    pub imbalances: Vec<VolumeRate>,
    /// Iterations performed
    pub iterations: usize,
    pub converged: bool,
    pub status: SolveStatus,
    /// Largest level change of the final iteration
    pub max_delta: Length,
    /// Largest level change of every iteration, in order
    pub delta_history: Vec<Length>,
}

impl SolveResult {
    pub fn level(&self, id: NodeId) -> Option<Length> {
        self.levels.get(id.slot()).copied()
    }

    pub fn flow(&self, id: GateId) -> Option<VolumeRate> {
        self.flows.get(id.slot()).copied()
    }

    pub fn imbalance(&self, id: NodeId) -> Option<VolumeRate> {
        self.imbalances.get(id.slot()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!(SolveStatus::Converged.to_string(), "converged");
        assert_eq!(
            SolveStatus::MaxIterationsExceeded.as_str(),
            "max_iterations_exceeded"
        );
        assert!(SolveStatus::Converged.is_converged());
        assert!(!SolveStatus::Diverged.is_converged());
    }
}
