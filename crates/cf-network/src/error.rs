//! Network-specific error types.

use cf_core::{CfError, GateId, NodeId};

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Network construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Two nodes share a key.
    DuplicateNodeKey { key: String },

    /// Two gates share a key.
    DuplicateGateKey { key: String },

    /// A node or gate has an empty key.
    EmptyKey { what: &'static str },

    /// A gate refers to a node ID that doesn't exist.
    DanglingNodeRef { gate: String, node: NodeId },

    /// A gate refers to a node key that doesn't exist.
    UnknownNodeKey { gate: String, node_key: String },

    /// A gate connects a node to itself.
    SelfLoop { gate: String, node: NodeId },

    /// A static parameter is outside its physical range.
    InvalidParameter {
        entity: String,
        parameter: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// Adjacency list is inconsistent (link in node's list but gate doesn't touch node).
    InconsistentAdjacency { gate: GateId, node: NodeId },

    /// IDs are not contiguous with their storage index.
    NonContiguousId { what: &'static str, index: usize },
}

impl NetworkError {
    /// Wrap a range/finiteness failure with the entity it belongs to.
    pub(crate) fn parameter(entity: String, err: CfError) -> Self {
        match err {
            CfError::OutOfRange {
                what,
                value,
                expected,
            } => NetworkError::InvalidParameter {
                entity,
                parameter: what,
                value,
                expected,
            },
            CfError::NonFinite { what, value } => NetworkError::InvalidParameter {
                entity,
                parameter: what,
                value,
                expected: "finite",
            },
        }
    }
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::DuplicateNodeKey { key } => {
                write!(f, "Duplicate node id '{}'", key)
            }
            NetworkError::DuplicateGateKey { key } => {
                write!(f, "Duplicate gate id '{}'", key)
            }
            NetworkError::EmptyKey { what } => write!(f, "Empty {} id", what),
            NetworkError::DanglingNodeRef { gate, node } => {
                write!(f, "Gate '{}' refers to non-existent node {}", gate, node)
            }
            NetworkError::UnknownNodeKey { gate, node_key } => {
                write!(f, "Gate '{}' refers to unknown node '{}'", gate, node_key)
            }
            NetworkError::SelfLoop { gate, node } => {
                write!(f, "Gate '{}' connects node {} to itself", gate, node)
            }
            NetworkError::InvalidParameter {
                entity,
                parameter,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid parameter {} = {} on {} (expected {})",
                    parameter, value, entity, expected
                )
            }
            NetworkError::InconsistentAdjacency { gate, node } => {
                write!(
                    f,
                    "Gate {} in node {}'s adjacency list but doesn't touch that node",
                    gate, node
                )
            }
            NetworkError::NonContiguousId { what, index } => {
                write!(f, "{} at index {} has a mismatched ID", what, index)
            }
        }
    }
}

impl std::error::Error for NetworkError {}
