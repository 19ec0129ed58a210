//! Core network data structures.

use std::collections::HashMap;

use cf_core::units::{Area, Length};
use cf_core::{GateId, NodeId};

/// Which end of a gate a node sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateEnd {
    /// The node the gate draws from (positive flow leaves it).
    Upstream,
    /// The node the gate discharges into (positive flow enters it).
    Downstream,
}

impl GateEnd {
    /// Sign applied to a gate flow when accumulating a node imbalance.
    ///
    /// Flow counts as outflow at the upstream node and inflow at the downstream node.
    pub fn inflow_sign(self) -> f64 {
        match self {
            GateEnd::Upstream => -1.0,
            GateEnd::Downstream => 1.0,
        }
    }
}

/// A point in the canal network with a water level and storage capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Caller-facing unique key (e.g. "m1").
    pub key: String,
    pub name: String,
    /// Current water level; the imposed level for fixed nodes, the initial guess otherwise.
    pub level: Length,
    /// Plan area converting a flow imbalance into a level change. Unused for fixed nodes.
    pub storage_area: Area,
    /// Boundary node whose level is imposed and never updated by the solver.
    pub fixed: bool,
}

/// A controllable structure connecting two nodes.
///
/// A gate does not own its nodes; it refers to them by ID and the network
/// resolves the references.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub id: GateId,
    pub key: String,
    pub name: String,
    pub upstream: NodeId,
    pub downstream: NodeId,
    /// Opening fraction: 0.0 (closed) to 1.0 (fully open).
    pub opening: f64,
    /// Discharge coefficient (dimensionless, typically 0.55-0.65)
    pub cd: f64,
    /// Flow area at full opening
    pub area: Area,
}

/// One entry of a node's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateLink {
    pub gate: GateId,
    pub end: GateEnd,
}

/// The network: a validated, immutable collection of nodes and gates.
///
/// The network stores:
/// - All nodes and gates in vectors (indexed by their IDs).
/// - Compact adjacency: for each node, which gate ends are incident.
/// - Key lookup tables for caller-facing identifiers.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) gates: Vec<Gate>,

    /// node i's links are in node_links[node_link_offsets[i]..node_link_offsets[i+1]].
    pub(crate) node_link_offsets: Vec<usize>,
    pub(crate) node_links: Vec<GateLink>,

    pub(crate) node_keys: HashMap<String, NodeId>,
    pub(crate) gate_keys: HashMap<String, GateId>,
}

impl Network {
    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all gates.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    /// Get a gate by ID (returns None if ID out of bounds).
    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(id.slot())
    }

    /// Resolve a node key to its ID.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.node_keys.get(key).copied()
    }

    /// Resolve a gate key to its ID.
    pub fn gate_id(&self, key: &str) -> Option<GateId> {
        self.gate_keys.get(key).copied()
    }

    /// Gate ends incident to a given node.
    pub fn node_links(&self, node_id: NodeId) -> &[GateLink] {
        let idx = node_id.slot();
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_link_offsets[idx];
        let end = self.node_link_offsets[idx + 1];
        &self.node_links[start..end]
    }

    /// Iterate over nodes the solver updates.
    pub fn free_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.fixed)
    }

    /// Iterate over boundary nodes.
    pub fn fixed_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.fixed)
    }

    /// Gates sharing the ordered (upstream, downstream) pair of the given gate, itself included.
    pub fn parallel_gates(&self, id: GateId) -> Vec<GateId> {
        let Some(gate) = self.gate(id) else {
            return Vec::new();
        };
        self.gates
            .iter()
            .filter(|g| g.upstream == gate.upstream && g.downstream == gate.downstream)
            .map(|g| g.id)
            .collect()
    }
}
