//! Free-node indexing for solver integration.
//!
//! Provides bidirectional mappings between node IDs and the contiguous
//! unknown slots (0..N) the solver iterates over.

use cf_core::NodeId;

use crate::graph::Network;

/// Index map from non-fixed nodes to contiguous solver slots.
///
/// Slots follow node ID order, so the mapping is deterministic for a given network.
#[derive(Debug, Clone)]
pub struct FreeNodeIndex {
    /// Slot -> NodeId.
    free_ids: Vec<NodeId>,

    /// NodeId -> slot; None for fixed nodes.
    node_to_slot: Vec<Option<usize>>,
}

impl FreeNodeIndex {
    /// Build the index from a network's fixed flags.
    pub fn from_network(network: &Network) -> Self {
        let nodes = network.nodes();
        let mut free_ids = Vec::new();
        let mut node_to_slot = vec![None; nodes.len()];

        for node in nodes {
            if !node.fixed {
                node_to_slot[node.id.slot()] = Some(free_ids.len());
                free_ids.push(node.id);
            }
        }

        Self {
            free_ids,
            node_to_slot,
        }
    }

    /// Number of free nodes.
    pub fn len(&self) -> usize {
        self.free_ids.len()
    }

    /// True when every node is fixed.
    pub fn is_empty(&self) -> bool {
        self.free_ids.is_empty()
    }

    /// Slot for a node, or None if the node is fixed or unknown.
    pub fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_to_slot.get(id.slot()).copied().flatten()
    }

    /// Node ID stored in a slot (panics if out of bounds).
    pub fn node_id(&self, slot: usize) -> NodeId {
        self.free_ids[slot]
    }

    /// All free node IDs in slot order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.free_ids
    }
}
