//! Incremental network builder.

use std::collections::HashMap;

use cf_core::units::{Area, Length, m2};
use cf_core::{GateId, NodeId};
use tracing::debug;

use crate::error::{NetworkError, NetworkResult};
use crate::graph::{Gate, GateEnd, GateLink, Network, Node};
use crate::validate;

/// Description of a node to add to the network.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub key: String,
    pub name: Option<String>,
    pub level: Length,
    pub storage_area: Area,
    pub fixed: bool,
}

impl NodeSpec {
    /// A node whose level the solver computes.
    pub fn free(key: impl Into<String>, initial_level: Length, storage_area: Area) -> Self {
        Self {
            key: key.into(),
            name: None,
            level: initial_level,
            storage_area,
            fixed: false,
        }
    }

    /// A boundary node with an imposed level.
    pub fn fixed(key: impl Into<String>, level: Length) -> Self {
        Self {
            key: key.into(),
            name: None,
            level,
            storage_area: m2(0.0),
            fixed: true,
        }
    }

    /// Attach a human-readable name (defaults to the key).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Description of a gate to add to the network.
#[derive(Debug, Clone, PartialEq)]
pub struct GateSpec {
    pub key: String,
    pub name: Option<String>,
    pub upstream: NodeId,
    pub downstream: NodeId,
    pub opening: f64,
    pub cd: f64,
    pub area: Area,
}

impl GateSpec {
    /// Create a fully open gate.
    pub fn new(
        key: impl Into<String>,
        upstream: NodeId,
        downstream: NodeId,
        cd: f64,
        area: Area,
    ) -> Self {
        Self {
            key: key.into(),
            name: None,
            upstream,
            downstream,
            opening: 1.0,
            cd,
            area,
        }
    }

    /// Set the opening fraction.
    pub fn with_opening(mut self, opening: f64) -> Self {
        self.opening = opening;
        self
    }

    /// Attach a human-readable name (defaults to the key).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Builder for constructing a network incrementally.
///
/// Use `add_node` and `add_gate` to build up the network,
/// then call `build()` to validate and freeze it into an immutable `Network`.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    gates: Vec<Gate>,
    next_node_id: u32,
    next_gate_id: u32,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the network and return its ID.
    pub fn add_node(&mut self, spec: NodeSpec) -> NodeId {
        let id = NodeId::from_index(self.next_node_id);
        self.next_node_id += 1;
        let name = spec.name.unwrap_or_else(|| spec.key.clone());
        self.nodes.push(Node {
            id,
            key: spec.key,
            name,
            level: spec.level,
            storage_area: spec.storage_area,
            fixed: spec.fixed,
        });
        id
    }

    /// Add a gate between two previously added nodes.
    ///
    /// References are checked by `build()`, so a dangling ID is reported there.
    pub fn add_gate(&mut self, spec: GateSpec) -> GateId {
        let id = GateId::from_index(self.next_gate_id);
        self.next_gate_id += 1;
        let name = spec.name.unwrap_or_else(|| spec.key.clone());
        self.gates.push(Gate {
            id,
            key: spec.key,
            name,
            upstream: spec.upstream,
            downstream: spec.downstream,
            opening: spec.opening,
            cd: spec.cd,
            area: spec.area,
        });
        id
    }

    /// Look up a node added earlier by its key.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.key == key).map(|n| n.id)
    }

    /// Add a gate whose endpoints are given by node key.
    pub fn add_gate_between(
        &mut self,
        key: impl Into<String>,
        upstream_key: &str,
        downstream_key: &str,
        opening: f64,
        cd: f64,
        area: Area,
    ) -> NetworkResult<GateId> {
        let key = key.into();
        let upstream = self
            .node_id(upstream_key)
            .ok_or_else(|| NetworkError::UnknownNodeKey {
                gate: key.clone(),
                node_key: upstream_key.to_string(),
            })?;
        let downstream =
            self.node_id(downstream_key)
                .ok_or_else(|| NetworkError::UnknownNodeKey {
                    gate: key.clone(),
                    node_key: downstream_key.to_string(),
                })?;
        Ok(self.add_gate(GateSpec::new(key, upstream, downstream, cd, area).with_opening(opening)))
    }

    /// Build and validate the network, returning an immutable `Network`.
    ///
    /// This performs validation and constructs compact adjacency lists.
    pub fn build(self) -> NetworkResult<Network> {
        validate::validate_structure(&self.nodes, &self.gates)?;
        validate::validate_parameters(&self.nodes, &self.gates)?;

        let (node_link_offsets, node_links) = Self::build_adjacency(&self.nodes, &self.gates);
        validate::validate_adjacency(&self.nodes, &self.gates, &node_link_offsets, &node_links)?;

        let node_keys: HashMap<String, NodeId> =
            self.nodes.iter().map(|n| (n.key.clone(), n.id)).collect();
        let gate_keys: HashMap<String, GateId> =
            self.gates.iter().map(|g| (g.key.clone(), g.id)).collect();

        debug!(
            nodes = self.nodes.len(),
            gates = self.gates.len(),
            "network built"
        );

        Ok(Network {
            nodes: self.nodes,
            gates: self.gates,
            node_link_offsets,
            node_links,
            node_keys,
            gate_keys,
        })
    }

    /// Build compact adjacency lists: for each node, collect its incident gate ends.
    fn build_adjacency(nodes: &[Node], gates: &[Gate]) -> (Vec<usize>, Vec<GateLink>) {
        let mut per_node: Vec<Vec<GateLink>> = vec![Vec::new(); nodes.len()];
        for gate in gates {
            per_node[gate.upstream.slot()].push(GateLink {
                gate: gate.id,
                end: GateEnd::Upstream,
            });
            per_node[gate.downstream.slot()].push(GateLink {
                gate: gate.id,
                end: GateEnd::Downstream,
            });
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::with_capacity(gates.len() * 2);
        offsets.push(0);
        for links in per_node {
            flat.extend(links);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::units::m;

    fn chain() -> NetworkBuilder {
        let mut builder = NetworkBuilder::new();
        let src = builder.add_node(NodeSpec::fixed("source", m(221.0)));
        let m1 = builder.add_node(NodeSpec::free("m1", m(219.0), m2(5000.0)));
        let m2_id = builder.add_node(NodeSpec::free("m2", m(218.9), m2(5000.0)));
        builder.add_gate(GateSpec::new("g1", src, m1, 0.6, m2(1.93)));
        builder.add_gate(GateSpec::new("g2", m1, m2_id, 0.6, m2(1.93)));
        builder
    }

    #[test]
    fn builder_basic() {
        let builder = chain();
        assert_eq!(builder.nodes.len(), 3);
        assert_eq!(builder.gates.len(), 2);
        assert_eq!(builder.nodes[1].id.index(), 1);
        assert_eq!(builder.gates[1].id.index(), 1);
        assert_eq!(builder.nodes[0].name, "source");
    }

    #[test]
    fn builder_build_chain() {
        let network = chain().build().unwrap();
        let m1 = network.node_id("m1").unwrap();

        assert_eq!(network.nodes().len(), 3);
        assert_eq!(network.gates().len(), 2);
        assert_eq!(network.free_nodes().count(), 2);
        assert_eq!(network.fixed_nodes().count(), 1);

        let links = network.node_links(m1);
        assert_eq!(links.len(), 2);
        assert!(links.iter().any(|l| l.end == GateEnd::Downstream));
        assert!(links.iter().any(|l| l.end == GateEnd::Upstream));
    }

    #[test]
    fn add_gate_between_resolves_keys() {
        let mut builder = NetworkBuilder::new();
        builder.add_node(NodeSpec::fixed("a", m(10.0)));
        builder.add_node(NodeSpec::free("b", m(9.0), m2(100.0)));
        let g = builder
            .add_gate_between("ab", "a", "b", 0.5, 0.6, m2(1.0))
            .unwrap();
        let network = builder.build().unwrap();
        let gate = network.gate(g).unwrap();
        assert_eq!(gate.opening, 0.5);
        assert_eq!(network.gate_id("ab"), Some(g));
    }

    #[test]
    fn add_gate_between_unknown_key() {
        let mut builder = NetworkBuilder::new();
        builder.add_node(NodeSpec::fixed("a", m(10.0)));
        let err = builder
            .add_gate_between("ab", "a", "nowhere", 1.0, 0.6, m2(1.0))
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::UnknownNodeKey {
                gate: "ab".into(),
                node_key: "nowhere".into()
            }
        );
    }
}
