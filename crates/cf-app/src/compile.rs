//! Compilation of project definitions into solver inputs.

use cf_core::units::{m, m2, s};
use cf_network::{GateSpec, Network, NetworkBuilder, NodeSpec};
use cf_project::schema::{NetworkDef, SolverDef};
use cf_solver::{DivergencePolicy, SolverConfig};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Build a validated network from its project definition.
pub fn compile_network(def: &NetworkDef) -> AppResult<Network> {
    let mut builder = NetworkBuilder::new();

    for node in &def.nodes {
        let spec = if node.fixed {
            NodeSpec::fixed(node.id.clone(), m(node.level_m))
        } else {
            let area = node.storage_area_m2.ok_or_else(|| {
                AppError::Compile(format!("Node '{}' has no storage area", node.id))
            })?;
            NodeSpec::free(node.id.clone(), m(node.level_m), m2(area))
        };
        builder.add_node(spec.with_name(node.name.clone()));
    }

    for gate in &def.gates {
        let up = builder.node_id(&gate.from_node_id).ok_or_else(|| {
            AppError::Compile(format!("Node not found: {}", gate.from_node_id))
        })?;
        let down = builder.node_id(&gate.to_node_id).ok_or_else(|| {
            AppError::Compile(format!("Node not found: {}", gate.to_node_id))
        })?;
        builder.add_gate(
            GateSpec::new(gate.id.clone(), up, down, gate.cd, m2(gate.area_m2))
                .with_opening(gate.opening)
                .with_name(gate.name.clone()),
        );
    }

    let network = builder.build()?;
    debug!(
        network = %def.id,
        nodes = network.nodes().len(),
        gates = network.gates().len(),
        "Compiled network"
    );
    Ok(network)
}

/// Translate stored solver settings into a solver configuration.
pub fn solver_config(def: &SolverDef) -> SolverConfig {
    let divergence = match def.divergence {
        Some(d) => DivergencePolicy {
            enabled: d.enabled,
            window: d.window,
            threshold: m(d.threshold_m),
        },
        None => DivergencePolicy::default(),
    };
    SolverConfig::default()
        .with_tolerance(m(def.tolerance_m))
        .with_max_iterations(def.max_iterations)
        .with_dt_relax(s(def.dt_relax_s))
        .with_divergence(divergence)
}
