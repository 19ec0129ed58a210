//! Project validation logic.

use crate::schema::{GateDef, NetworkDef, NodeDef, Project, SolverDef};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_solver(&project.solver, "solver")?;

    let mut network_ids = HashSet::new();
    for network in &project.networks {
        if !network_ids.insert(&network.id) {
            return Err(ValidationError::DuplicateId {
                id: network.id.clone(),
                context: "networks".to_string(),
            });
        }
        validate_network(network)?;
    }

    Ok(())
}

fn validate_network(network: &NetworkDef) -> Result<(), ValidationError> {
    if let Some(solver) = &network.solver {
        validate_solver(solver, &format!("network '{}' solver", network.id))?;
    }

    let mut nodes: HashMap<&String, &NodeDef> = HashMap::new();
    for node in &network.nodes {
        if nodes.insert(&node.id, node).is_some() {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: format!("network '{}' nodes", network.id),
            });
        }
        validate_node(node)?;
    }

    let mut gate_ids = HashSet::new();
    for gate in &network.gates {
        if !gate_ids.insert(&gate.id) {
            return Err(ValidationError::DuplicateId {
                id: gate.id.clone(),
                context: format!("network '{}' gates", network.id),
            });
        }
        validate_gate(gate, &nodes, &network.id)?;
    }

    Ok(())
}

fn validate_node(node: &NodeDef) -> Result<(), ValidationError> {
    if node.id.is_empty() {
        return Err(invalid("node.id", "", "must not be empty"));
    }
    if !node.level_m.is_finite() {
        return Err(invalid(
            &format!("node '{}' level_m", node.id),
            node.level_m,
            "must be finite",
        ));
    }
    if node.fixed {
        return Ok(());
    }
    match node.storage_area_m2 {
        None => Err(ValidationError::InvalidValue {
            field: format!("node '{}' storage_area_m2", node.id),
            value: "missing".to_string(),
            reason: "required for non-fixed nodes".to_string(),
        }),
        Some(area) if !(area.is_finite() && area > 0.0) => Err(invalid(
            &format!("node '{}' storage_area_m2", node.id),
            area,
            "must be > 0",
        )),
        Some(_) => Ok(()),
    }
}

fn validate_gate(
    gate: &GateDef,
    nodes: &HashMap<&String, &NodeDef>,
    network_id: &str,
) -> Result<(), ValidationError> {
    if gate.id.is_empty() {
        return Err(invalid("gate.id", "", "must not be empty"));
    }
    for node_id in [&gate.from_node_id, &gate.to_node_id] {
        if !nodes.contains_key(node_id) {
            return Err(ValidationError::MissingReference {
                id: node_id.clone(),
                context: format!("network '{}' gate '{}'", network_id, gate.id),
            });
        }
    }
    if gate.from_node_id == gate.to_node_id {
        return Err(invalid(
            &format!("gate '{}' to_node_id", gate.id),
            &gate.to_node_id,
            "must differ from from_node_id",
        ));
    }
    if !(0.0..=1.0).contains(&gate.opening) {
        return Err(invalid(
            &format!("gate '{}' opening", gate.id),
            gate.opening,
            "must be in [0, 1]",
        ));
    }
    if !(gate.cd.is_finite() && gate.cd > 0.0) {
        return Err(invalid(
            &format!("gate '{}' cd", gate.id),
            gate.cd,
            "must be > 0",
        ));
    }
    if !(gate.area_m2.is_finite() && gate.area_m2 > 0.0) {
        return Err(invalid(
            &format!("gate '{}' area_m2", gate.id),
            gate.area_m2,
            "must be > 0",
        ));
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef, context: &str) -> Result<(), ValidationError> {
    if !(solver.tolerance_m.is_finite() && solver.tolerance_m > 0.0) {
        return Err(invalid(
            &format!("{} tolerance_m", context),
            solver.tolerance_m,
            "must be > 0",
        ));
    }
    if !(solver.dt_relax_s.is_finite() && solver.dt_relax_s > 0.0) {
        return Err(invalid(
            &format!("{} dt_relax_s", context),
            solver.dt_relax_s,
            "must be > 0",
        ));
    }
    if solver.max_iterations == 0 {
        return Err(invalid(
            &format!("{} max_iterations", context),
            0,
            "must be >= 1",
        ));
    }
    if let Some(div) = &solver.divergence {
        if div.window == 0 {
            return Err(invalid(
                &format!("{} divergence.window", context),
                0,
                "must be >= 1",
            ));
        }
        if !(div.threshold_m.is_finite() && div.threshold_m >= 0.0) {
            return Err(invalid(
                &format!("{} divergence.threshold_m", context),
                div.threshold_m,
                "must be >= 0",
            ));
        }
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
