//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub solver: SolverDef,
    #[serde(default)]
    pub networks: Vec<NetworkDef>,
}

impl Project {
    pub fn network(&self, id: &str) -> Option<&NetworkDef> {
        self.networks.iter().find(|n| n.id == id)
    }
}

/// Solver settings as stored in a project file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default = "default_tolerance_m")]
    pub tolerance_m: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_dt_relax_s")]
    pub dt_relax_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergence: Option<DivergenceDef>,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            tolerance_m: default_tolerance_m(),
            max_iterations: default_max_iterations(),
            dt_relax_s: default_dt_relax_s(),
            divergence: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DivergenceDef {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_divergence_window")]
    pub window: usize,
    #[serde(default = "default_divergence_threshold_m")]
    pub threshold_m: f64,
}

impl Default for DivergenceDef {
    fn default() -> Self {
        Self {
            enabled: true,
            window: default_divergence_window(),
            threshold_m: default_divergence_threshold_m(),
        }
    }
}

fn default_tolerance_m() -> f64 {
    1e-3
}

fn default_max_iterations() -> usize {
    100
}

fn default_dt_relax_s() -> f64 {
    60.0
}

fn default_true() -> bool {
    true
}

fn default_divergence_window() -> usize {
    5
}

fn default_divergence_threshold_m() -> f64 {
    0.05
}

fn default_opening() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub id: String,
    pub name: String,
    /// Replaces the project-wide solver settings for this network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverDef>,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub gates: Vec<GateDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: String,
    pub name: String,
    /// Imposed level for fixed nodes, initial guess otherwise
    pub level_m: f64,
    /// Plan area of the pool; required for free nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_area_m2: Option<f64>,
    #[serde(default)]
    pub fixed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateDef {
    pub id: String,
    pub name: String,
    pub from_node_id: String,
    pub to_node_id: String,
    #[serde(default = "default_opening")]
    pub opening: f64,
    pub cd: f64,
    pub area_m2: f64,
}

/// Settings that apply to a network: its own override, else the project's.
pub fn effective_solver(project: &Project, network: &NetworkDef) -> SolverDef {
    network.solver.unwrap_or(project.solver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_uses_defaults() {
        let yaml = r#"
version: 1
name: Tiny
networks:
  - id: main
    name: Main
    nodes:
      - { id: s, name: Source, level_m: 10.0, fixed: true }
      - { id: p, name: Pool, level_m: 9.0, storage_area_m2: 100.0 }
    gates:
      - { id: g, name: Gate, from_node_id: s, to_node_id: p, cd: 0.6, area_m2: 1.0 }
"#;
        let project: Project = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(project.solver, SolverDef::default());
        let net = project.network("main").unwrap();
        assert!(net.nodes[0].fixed);
        assert!(!net.nodes[1].fixed);
        assert_eq!(net.nodes[0].storage_area_m2, None);
        assert_eq!(net.gates[0].opening, 1.0);
        assert_eq!(effective_solver(&project, net).max_iterations, 100);
    }

    #[test]
    fn network_override_wins() {
        let yaml = r#"
version: 1
name: Override
solver: { tolerance_m: 0.01 }
networks:
  - id: a
    name: A
    solver: { max_iterations: 400, dt_relax_s: 20.0 }
"#;
        let project: Project = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(project.solver.tolerance_m, 0.01);
        assert_eq!(project.solver.max_iterations, 100);

        let net = project.network("a").unwrap();
        let solver = effective_solver(&project, net);
        assert_eq!(solver.max_iterations, 400);
        assert_eq!(solver.dt_relax_s, 20.0);
        // The override is a whole block, not merged field by field.
        assert_eq!(solver.tolerance_m, 1e-3);
    }
}
