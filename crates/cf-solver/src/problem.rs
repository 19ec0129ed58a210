//! Problem definition for steady-state level solving.

use cf_core::units::Length;
use cf_core::{GateId, NodeId};
use cf_hydraulics::SluiceGate;
use cf_network::Network;

use crate::error::{SolverError, SolverResult};
use crate::result::SolveResult;

/// Steady-state problem: a network plus the operating point to solve for.
///
/// Starts from the values stored on the network; setters override boundary
/// levels, initial guesses and gate openings for this solve only. The network
/// itself is never modified.
#[derive(Debug, Clone)]
pub struct SteadyProblem<'a> {
    /// Network topology and static parameters
    pub network: &'a Network,

    /// Per-node level: imposed level for fixed nodes, initial guess for free nodes
    pub levels: Vec<Length>,

    /// Per-gate opening fraction
    pub openings: Vec<f64>,
}

impl<'a> SteadyProblem<'a> {
    /// Create a problem using the network's own levels and openings.
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            levels: network.nodes().iter().map(|n| n.level).collect(),
            openings: network.gates().iter().map(|g| g.opening).collect(),
        }
    }

    /// Set the imposed level of a fixed node.
    pub fn set_fixed_level(&mut self, node: NodeId, level: Length) -> SolverResult<()> {
        let n = self.node(node)?;
        if !n.fixed {
            return Err(SolverError::ProblemSetup {
                what: format!("Node '{}' is not fixed; set an initial level instead", n.key),
            });
        }
        self.levels[node.slot()] = level;
        Ok(())
    }

    /// Set the initial guess of a free node.
    pub fn set_initial_level(&mut self, node: NodeId, level: Length) -> SolverResult<()> {
        let n = self.node(node)?;
        if n.fixed {
            return Err(SolverError::ProblemSetup {
                what: format!("Node '{}' is fixed; set a fixed level instead", n.key),
            });
        }
        self.levels[node.slot()] = level;
        Ok(())
    }

    /// Set a node's level by key, whichever role the node plays.
    pub fn set_level_by_key(&mut self, key: &str, level: Length) -> SolverResult<()> {
        let id = self.network.node_id(key).ok_or_else(|| SolverError::ProblemSetup {
            what: format!("Unknown node '{}'", key),
        })?;
        self.levels[id.slot()] = level;
        Ok(())
    }

    /// Set a gate opening for this solve.
    pub fn set_gate_opening(&mut self, gate: GateId, opening: f64) -> SolverResult<()> {
        if self.network.gate(gate).is_none() {
            return Err(SolverError::ProblemSetup {
                what: format!("Gate {} not found", gate),
            });
        }
        self.openings[gate.slot()] = opening;
        Ok(())
    }

    /// Set a gate opening by key.
    pub fn set_opening_by_key(&mut self, key: &str, opening: f64) -> SolverResult<()> {
        let id = self.network.gate_id(key).ok_or_else(|| SolverError::ProblemSetup {
            what: format!("Unknown gate '{}'", key),
        })?;
        self.set_gate_opening(id, opening)
    }

    /// Seed free-node guesses from an earlier result on the same network.
    pub fn warm_start(&mut self, previous: &SolveResult) -> SolverResult<()> {
        if previous.levels.len() != self.levels.len() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "Warm start has {} levels, network has {} nodes",
                    previous.levels.len(),
                    self.levels.len()
                ),
            });
        }
        for node in self.network.free_nodes() {
            self.levels[node.id.slot()] = previous.levels[node.id.slot()];
        }
        Ok(())
    }

    /// Number of unknowns.
    pub fn num_free_nodes(&self) -> usize {
        self.network.free_nodes().count()
    }

    /// Validate problem setup.
    pub fn validate(&self) -> SolverResult<()> {
        let node_count = self.network.nodes().len();
        let gate_count = self.network.gates().len();

        if self.levels.len() != node_count {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "levels length mismatch: {} != {}",
                    self.levels.len(),
                    node_count
                ),
            });
        }
        if self.openings.len() != gate_count {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "openings length mismatch: {} != {}",
                    self.openings.len(),
                    gate_count
                ),
            });
        }

        for node in self.network.nodes() {
            let level = self.levels[node.id.slot()].value;
            if !level.is_finite() {
                return Err(SolverError::ProblemSetup {
                    what: format!("Node '{}' has non-finite level {}", node.key, level),
                });
            }
        }

        self.sluice_gates().map(|_| ())
    }

    /// Flow structures for every gate, with this problem's openings applied.
    pub(crate) fn sluice_gates(&self) -> SolverResult<Vec<SluiceGate>> {
        self.network
            .gates()
            .iter()
            .map(|gate| {
                SluiceGate::from_gate(gate, Some(self.openings[gate.id.slot()])).map_err(
                    |source| SolverError::Gate {
                        gate: gate.key.clone(),
                        source,
                    },
                )
            })
            .collect()
    }

    fn node(&self, id: NodeId) -> SolverResult<&'a cf_network::Node> {
        self.network
            .node(id)
            .ok_or_else(|| SolverError::ProblemSetup {
                what: format!("Node {} not found", id),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::units::{m, m2};
    use cf_network::{GateSpec, NetworkBuilder, NodeSpec};

    fn network() -> Network {
        let mut builder = NetworkBuilder::new();
        let a = builder.add_node(NodeSpec::fixed("a", m(10.0)));
        let b = builder.add_node(NodeSpec::free("b", m(9.0), m2(100.0)));
        builder.add_gate(GateSpec::new("g", a, b, 0.6, m2(1.0)));
        builder.build().unwrap()
    }

    #[test]
    fn defaults_come_from_network() {
        let net = network();
        let problem = SteadyProblem::new(&net);
        assert_eq!(problem.levels[0].value, 10.0);
        assert_eq!(problem.levels[1].value, 9.0);
        assert_eq!(problem.openings, vec![1.0]);
        assert_eq!(problem.num_free_nodes(), 1);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn role_checked_setters() {
        let net = network();
        let a = net.node_id("a").unwrap();
        let b = net.node_id("b").unwrap();
        let mut problem = SteadyProblem::new(&net);

        assert!(problem.set_fixed_level(a, m(11.0)).is_ok());
        assert!(problem.set_fixed_level(b, m(11.0)).is_err());
        assert!(problem.set_initial_level(b, m(9.5)).is_ok());
        assert!(problem.set_initial_level(a, m(9.5)).is_err());
        assert_eq!(problem.levels[0].value, 11.0);
        assert_eq!(problem.levels[1].value, 9.5);
        // The network keeps its own values.
        assert_eq!(net.node(a).unwrap().level.value, 10.0);
    }

    #[test]
    fn opening_override_is_validated() {
        let net = network();
        let mut problem = SteadyProblem::new(&net);
        problem.set_opening_by_key("g", 1.5).unwrap();
        let err = problem.validate().unwrap_err();
        assert!(matches!(err, SolverError::Gate { ref gate, .. } if gate == "g"));

        assert!(problem.set_opening_by_key("missing", 0.5).is_err());
    }

    #[test]
    fn non_finite_level_is_rejected() {
        let net = network();
        let mut problem = SteadyProblem::new(&net);
        problem.set_level_by_key("b", m(f64::NAN)).unwrap();
        assert!(matches!(
            problem.validate(),
            Err(SolverError::ProblemSetup { .. })
        ));
    }
}
