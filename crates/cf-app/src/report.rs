//! Serializable solve reports.

use cf_network::Network;
use cf_solver::{SolveResult, SolverConfig};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    pub project: String,
    pub network_id: String,
    pub status: String,
    pub converged: bool,
    pub iterations: usize,
    pub max_delta_m: f64,
    pub settings: SettingsReport,
    pub timing: SolveTiming,
    pub nodes: Vec<NodeReport>,
    pub gates: Vec<GateReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettingsReport {
    pub tolerance_m: f64,
    pub max_iterations: usize,
    pub dt_relax_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SolveTiming {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    pub id: String,
    pub name: String,
    pub fixed: bool,
    pub level_m: f64,
    pub imbalance_m3s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReport {
    pub id: String,
    pub name: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub opening: f64,
    pub flow_m3s: f64,
}

impl SolveReport {
    /// Flatten a solve result into keyed rows.
    ///
    /// `openings` are the openings the solve actually used, indexed by gate slot.
    pub fn build(
        project: &str,
        network_id: &str,
        network: &Network,
        openings: &[f64],
        config: &SolverConfig,
        result: &SolveResult,
        timing: SolveTiming,
    ) -> Self {
        let nodes = network
            .nodes()
            .iter()
            .map(|node| NodeReport {
                id: node.key.clone(),
                name: node.name.clone(),
                fixed: node.fixed,
                level_m: result.level(node.id).map_or(f64::NAN, |h| h.value),
                imbalance_m3s: result.imbalance(node.id).map_or(f64::NAN, |i| i.value),
            })
            .collect();

        let gates = network
            .gates()
            .iter()
            .map(|gate| GateReport {
                id: gate.key.clone(),
                name: gate.name.clone(),
                from_node_id: key_of(network, gate.upstream),
                to_node_id: key_of(network, gate.downstream),
                opening: openings.get(gate.id.slot()).copied().unwrap_or(gate.opening),
                flow_m3s: result.flow(gate.id).map_or(f64::NAN, |q| q.value),
            })
            .collect();

        Self {
            project: project.to_string(),
            network_id: network_id.to_string(),
            status: result.status.to_string(),
            converged: result.converged,
            iterations: result.iterations,
            max_delta_m: result.max_delta.value,
            settings: SettingsReport {
                tolerance_m: config.tolerance.value,
                max_iterations: config.max_iterations,
                dt_relax_s: config.dt_relax.value,
            },
            timing,
            nodes,
            gates,
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn gate(&self, id: &str) -> Option<&GateReport> {
        self.gates.iter().find(|g| g.id == id)
    }
}

fn key_of(network: &Network, id: cf_core::NodeId) -> String {
    network
        .node(id)
        .map(|n| n.key.clone())
        .unwrap_or_else(|| id.to_string())
}
