//! Project loading, saving, validation, and introspection.

use std::path::Path;

use cf_project::schema::{NetworkDef, Project};

use crate::compile;
use crate::error::{AppError, AppResult};

/// Summary of a network for listing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
    pub node_count: usize,
    pub fixed_node_count: usize,
    pub gate_count: usize,
    pub has_solver_override: bool,
}

/// Load a project file (YAML, or JSON by extension), migrated and validated.
pub fn load_project(path: &Path) -> AppResult<Project> {
    Ok(cf_project::load(path)?)
}

/// Save a project as YAML or JSON depending on the extension.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => cf_project::save_json(path, project)?,
        _ => cf_project::save_yaml(path, project)?,
    }
    Ok(())
}

/// Validate the schema and check every network builds.
pub fn validate_project(project: &Project) -> AppResult<()> {
    cf_project::validate_project(project).map_err(|e| AppError::Validation(e.to_string()))?;

    for network in &project.networks {
        compile::compile_network(network)?;
    }

    Ok(())
}

/// List all networks in the project with summaries.
pub fn list_networks(project: &Project) -> Vec<NetworkSummary> {
    project
        .networks
        .iter()
        .map(|network| NetworkSummary {
            id: network.id.clone(),
            name: network.name.clone(),
            node_count: network.nodes.len(),
            fixed_node_count: network.nodes.iter().filter(|n| n.fixed).count(),
            gate_count: network.gates.len(),
            has_solver_override: network.solver.is_some(),
        })
        .collect()
}

/// Get a specific network by ID.
pub fn get_network<'a>(project: &'a Project, network_id: &str) -> AppResult<&'a NetworkDef> {
    project
        .network(network_id)
        .ok_or_else(|| AppError::NetworkNotFound(network_id.to_string()))
}
