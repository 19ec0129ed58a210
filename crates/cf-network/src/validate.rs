//! Network validation logic.

use std::collections::HashSet;

use cf_core::{GateId, ensure_finite, ensure_fraction, ensure_positive};
use tracing::debug;

use crate::error::{NetworkError, NetworkResult};
use crate::graph::{Gate, GateEnd, GateLink, Node};

/// Validate the network structure: keys are unique, all references exist, no self-loops.
pub(crate) fn validate_structure(nodes: &[Node], gates: &[Gate]) -> NetworkResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        if node.id.slot() != i {
            return Err(NetworkError::NonContiguousId {
                what: "node",
                index: i,
            });
        }
    }
    for (i, gate) in gates.iter().enumerate() {
        if gate.id.slot() != i {
            return Err(NetworkError::NonContiguousId {
                what: "gate",
                index: i,
            });
        }
    }

    let mut node_keys = HashSet::new();
    for node in nodes {
        if node.key.is_empty() {
            return Err(NetworkError::EmptyKey { what: "node" });
        }
        if !node_keys.insert(node.key.as_str()) {
            return Err(NetworkError::DuplicateNodeKey {
                key: node.key.clone(),
            });
        }
    }

    let mut gate_keys = HashSet::new();
    let mut pairs = HashSet::new();
    for gate in gates {
        if gate.key.is_empty() {
            return Err(NetworkError::EmptyKey { what: "gate" });
        }
        if !gate_keys.insert(gate.key.as_str()) {
            return Err(NetworkError::DuplicateGateKey {
                key: gate.key.clone(),
            });
        }

        for node in [gate.upstream, gate.downstream] {
            if node.slot() >= nodes.len() {
                return Err(NetworkError::DanglingNodeRef {
                    gate: gate.key.clone(),
                    node,
                });
            }
        }

        if gate.upstream == gate.downstream {
            return Err(NetworkError::SelfLoop {
                gate: gate.key.clone(),
                node: gate.upstream,
            });
        }

        // Parallel structures are allowed; each is computed independently.
        if !pairs.insert((gate.upstream, gate.downstream)) {
            debug!(gate = %gate.key, "parallel gate on an existing node pair");
        }
    }

    Ok(())
}

/// Validate static physical parameters of nodes and gates.
pub(crate) fn validate_parameters(nodes: &[Node], gates: &[Gate]) -> NetworkResult<()> {
    for node in nodes {
        let entity = || format!("node '{}'", node.key);
        ensure_finite(node.level.value, "level")
            .map_err(|e| NetworkError::parameter(entity(), e))?;
        if !node.fixed {
            ensure_positive(node.storage_area.value, "storage_area")
                .map_err(|e| NetworkError::parameter(entity(), e))?;
        }
    }

    for gate in gates {
        let entity = || format!("gate '{}'", gate.key);
        ensure_fraction(gate.opening, "opening")
            .map_err(|e| NetworkError::parameter(entity(), e))?;
        ensure_positive(gate.cd, "cd").map_err(|e| NetworkError::parameter(entity(), e))?;
        ensure_positive(gate.area.value, "area")
            .map_err(|e| NetworkError::parameter(entity(), e))?;
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    nodes: &[Node],
    gates: &[Gate],
    node_link_offsets: &[usize],
    node_links: &[GateLink],
) -> NetworkResult<()> {
    if node_link_offsets.len() != nodes.len() + 1 {
        return Err(NetworkError::NonContiguousId {
            what: "adjacency offsets",
            index: node_link_offsets.len(),
        });
    }

    for node in nodes {
        let idx = node.id.slot();
        let start = node_link_offsets[idx];
        let end = node_link_offsets[idx + 1];

        for link in &node_links[start..end] {
            let Some(gate) = gates.get(link.gate.slot()) else {
                return Err(NetworkError::InconsistentAdjacency {
                    gate: link.gate,
                    node: node.id,
                });
            };
            let touches = match link.end {
                GateEnd::Upstream => gate.upstream == node.id,
                GateEnd::Downstream => gate.downstream == node.id,
            };
            if !touches {
                return Err(NetworkError::InconsistentAdjacency {
                    gate: link.gate,
                    node: node.id,
                });
            }
        }
    }

    // Each gate appears exactly twice: once per end.
    let mut seen: HashSet<(GateId, GateEnd)> = HashSet::new();
    for link in node_links {
        if !seen.insert((link.gate, link.end)) {
            let gate = &gates[link.gate.slot()];
            return Err(NetworkError::InconsistentAdjacency {
                gate: link.gate,
                node: gate.upstream,
            });
        }
    }
    if seen.len() != gates.len() * 2 {
        return Err(NetworkError::NonContiguousId {
            what: "adjacency links",
            index: seen.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::Id;
    use cf_core::units::{m, m2};

    fn node(i: u32, key: &str, fixed: bool) -> Node {
        Node {
            id: Id::from_index(i),
            key: key.into(),
            name: key.into(),
            level: m(10.0),
            storage_area: m2(if fixed { 0.0 } else { 100.0 }),
            fixed,
        }
    }

    fn gate(i: u32, key: &str, up: u32, down: u32) -> Gate {
        Gate {
            id: Id::from_index(i),
            key: key.into(),
            name: key.into(),
            upstream: Id::from_index(up),
            downstream: Id::from_index(down),
            opening: 1.0,
            cd: 0.6,
            area: m2(1.0),
        }
    }

    #[test]
    fn validate_empty_network() {
        assert!(validate_structure(&[], &[]).is_ok());
        assert!(validate_parameters(&[], &[]).is_ok());
    }

    #[test]
    fn validate_dangling_node_ref() {
        let nodes = vec![node(0, "a", true)];
        let gates = vec![gate(0, "g", 0, 99)];
        let result = validate_structure(&nodes, &gates);
        assert_eq!(
            result.unwrap_err(),
            NetworkError::DanglingNodeRef {
                gate: "g".into(),
                node: Id::from_index(99)
            }
        );
    }

    #[test]
    fn validate_duplicate_node_key() {
        let nodes = vec![node(0, "a", true), node(1, "a", false)];
        assert!(matches!(
            validate_structure(&nodes, &[]),
            Err(NetworkError::DuplicateNodeKey { .. })
        ));
    }

    #[test]
    fn validate_self_loop() {
        let nodes = vec![node(0, "a", false)];
        let gates = vec![gate(0, "g", 0, 0)];
        assert!(matches!(
            validate_structure(&nodes, &gates),
            Err(NetworkError::SelfLoop { .. })
        ));
    }

    #[test]
    fn validate_parallel_gates_allowed() {
        let nodes = vec![node(0, "a", true), node(1, "b", false)];
        let gates = vec![gate(0, "g1", 0, 1), gate(1, "g2", 0, 1)];
        assert!(validate_structure(&nodes, &gates).is_ok());
    }

    #[test]
    fn validate_fixed_node_area_ignored() {
        let nodes = vec![node(0, "a", true)];
        assert!(validate_parameters(&nodes, &[]).is_ok());
    }

    #[test]
    fn validate_bad_gate_parameters() {
        let nodes = vec![node(0, "a", true), node(1, "b", false)];

        let mut g = gate(0, "g", 0, 1);
        g.cd = 0.0;
        let err = validate_parameters(&nodes, &[g]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::InvalidParameter {
                parameter: "cd",
                ..
            }
        ));

        let mut g = gate(0, "g", 0, 1);
        g.opening = 1.5;
        let err = validate_parameters(&nodes, &[g]).unwrap_err();
        assert!(err.to_string().contains("gate 'g'"));
    }
}
