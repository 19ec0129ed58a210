//! One synchronous relaxation pass over the whole network.
//!
//! A pass reads a single level snapshot, evaluates every gate on it, and
//! returns a brand new snapshot. Nothing is updated in place, so the result
//! does not depend on node or gate enumeration order.

use cf_core::units::{Accel, Time, m, m3ps};
use cf_hydraulics::{FlowStructure, HeadPair, SluiceGate, node_update};
use cf_network::{FreeNodeIndex, Network};
use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};
use crate::problem::SteadyProblem;

/// Validated, solver-ready view of a problem.
pub struct CompiledNetwork<'a> {
    pub(crate) network: &'a Network,
    pub(crate) gates: Vec<SluiceGate>,
    pub(crate) free: FreeNodeIndex,
}

impl<'a> CompiledNetwork<'a> {
    /// Resolve gate structures and free-node slots. Fails on any invalid parameter.
    pub fn compile(problem: &SteadyProblem<'a>) -> SolverResult<Self> {
        problem.validate()?;
        Ok(Self {
            network: problem.network,
            gates: problem.sluice_gates()?,
            free: FreeNodeIndex::from_network(problem.network),
        })
    }

    pub fn free_nodes(&self) -> &FreeNodeIndex {
        &self.free
    }
}

/// Everything one pass produces.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Candidate levels for every node (fixed nodes unchanged)
    pub levels: DVector<f64>,
    /// Gate flows evaluated on the input snapshot
    pub flows: DVector<f64>,
    /// Net inflow per node on the input snapshot
    pub imbalances: DVector<f64>,
    /// Largest |H' - H| over free nodes
    pub max_delta: f64,
}

/// A snapshot must hold one level per node, fixed nodes included.
fn check_snapshot(compiled: &CompiledNetwork<'_>, levels: &DVector<f64>) -> SolverResult<()> {
    let expected = compiled.network.nodes().len();
    if levels.len() != expected {
        return Err(SolverError::ProblemSetup {
            what: format!("level snapshot has {} entries, network has {expected} nodes", levels.len()),
        });
    }
    Ok(())
}

/// Flow through every gate for a level snapshot.
pub fn gate_flows(
    compiled: &CompiledNetwork<'_>,
    levels: &DVector<f64>,
    g: Accel,
) -> SolverResult<DVector<f64>> {
    check_snapshot(compiled, levels)?;
    let mut flows = DVector::zeros(compiled.gates.len());
    for (gate, structure) in compiled.network.gates().iter().zip(&compiled.gates) {
        let heads = HeadPair::new(m(levels[gate.upstream.slot()]), m(levels[gate.downstream.slot()]));
        let q = structure.flow(heads, g).map_err(|source| SolverError::Gate {
            gate: gate.key.clone(),
            source,
        })?;
        flows[gate.id.slot()] = q.value;
    }
    Ok(flows)
}

/// Net inflow per node: gate flow leaves its upstream node and enters its downstream node.
///
/// `flows` must come from [`gate_flows`] on the same network.
pub(crate) fn node_imbalances(compiled: &CompiledNetwork<'_>, flows: &DVector<f64>) -> DVector<f64> {
    let network = compiled.network;
    DVector::from_iterator(
        network.nodes().len(),
        network.nodes().iter().map(|node| {
            network
                .node_links(node.id)
                .iter()
                .map(|link| link.end.inflow_sign() * flows[link.gate.slot()])
                .sum::<f64>()
        }),
    )
}

/// Run one relaxation pass from `levels`.
pub fn relax_step(
    compiled: &CompiledNetwork<'_>,
    levels: &DVector<f64>,
    dt_relax: Time,
    g: Accel,
) -> SolverResult<StepOutcome> {
    let flows = gate_flows(compiled, levels, g)?;
    let imbalances = node_imbalances(compiled, &flows);

    let mut next = levels.clone();
    let mut max_delta = 0.0_f64;
    for &id in compiled.free.node_ids() {
        let i = id.slot();
        let node = &compiled.network.nodes()[i];
        let h = node_update(m(levels[i]), m3ps(imbalances[i]), node.storage_area, dt_relax)
            .map_err(|source| SolverError::Node {
                node: node.key.clone(),
                source,
            })?;
        max_delta = max_delta.max((h.value - levels[i]).abs());
        next[i] = h.value;
    }

    Ok(StepOutcome {
        levels: next,
        flows,
        imbalances,
        max_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::units::{constants, m2, s};
    use cf_network::{GateSpec, NetworkBuilder, NodeSpec};

    fn chain() -> Network {
        let mut builder = NetworkBuilder::new();
        let s0 = builder.add_node(NodeSpec::fixed("source", m(221.0)));
        let m1 = builder.add_node(NodeSpec::free("m1", m(219.0), m2(5000.0)));
        let m2_id = builder.add_node(NodeSpec::free("m2", m(218.9), m2(5000.0)));
        builder.add_gate(GateSpec::new("g1", s0, m1, 0.6, m2(1.93)));
        builder.add_gate(GateSpec::new("g2", m1, m2_id, 0.6, m2(1.93)));
        builder.build().unwrap()
    }

    #[test]
    fn first_pass_of_chain() {
        let net = chain();
        let problem = SteadyProblem::new(&net);
        let compiled = CompiledNetwork::compile(&problem).unwrap();
        let levels = DVector::from_vec(vec![221.0, 219.0, 218.9]);

        let out = relax_step(&compiled, &levels, s(60.0), constants::g()).unwrap();

        let q1 = 0.6 * 1.93 * (2.0 * 9.81 * 2.0_f64).sqrt();
        let q2 = 0.6 * 1.93 * (2.0 * 9.81 * 0.1_f64).sqrt();
        assert!((out.flows[0] - q1).abs() < 1e-9);
        assert!((out.flows[1] - q2).abs() < 1e-9);

        // Source gives q1 away; m1 keeps q1 - q2; m2 receives q2.
        assert!((out.imbalances[0] + q1).abs() < 1e-9);
        assert!((out.imbalances[1] - (q1 - q2)).abs() < 1e-9);
        assert!((out.imbalances[2] - q2).abs() < 1e-9);

        assert_eq!(out.levels[0], 221.0);
        assert!((out.levels[1] - (219.0 + (q1 - q2) * 60.0 / 5000.0)).abs() < 1e-12);
        assert!((out.max_delta - (q1 - q2) * 60.0 / 5000.0).abs() < 1e-12);
        // Input snapshot untouched.
        assert_eq!(levels[1], 219.0);
    }

    #[test]
    fn closed_gate_contributes_nothing() {
        let net = chain();
        let mut problem = SteadyProblem::new(&net);
        problem.set_opening_by_key("g2", 0.0).unwrap();
        let compiled = CompiledNetwork::compile(&problem).unwrap();
        let levels = DVector::from_vec(vec![221.0, 219.0, 218.9]);

        let out = relax_step(&compiled, &levels, s(60.0), constants::g()).unwrap();
        assert_eq!(out.flows[1], 0.0);
        assert_eq!(out.imbalances[2], 0.0);
        assert_eq!(out.levels[2], 218.9);
    }

    #[test]
    fn mismatched_snapshot_is_rejected() {
        let net = chain();
        let problem = SteadyProblem::new(&net);
        let compiled = CompiledNetwork::compile(&problem).unwrap();
        let short = DVector::from_vec(vec![221.0, 219.0]);

        let err = relax_step(&compiled, &short, s(60.0), constants::g()).unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
        assert!(gate_flows(&compiled, &short, constants::g()).is_err());
    }
}
