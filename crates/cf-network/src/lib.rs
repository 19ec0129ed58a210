//! cf-network: network model layer for canalflow.
//!
//! Provides:
//! - Core network data structures (Node, Gate, Network)
//! - Incremental network builder with validation
//! - Free-node indexing for solver integration
//!
//! # Example
//!
//! ```
//! use cf_core::units::{m, m2};
//! use cf_network::{GateSpec, NetworkBuilder, NodeSpec};
//!
//! let mut builder = NetworkBuilder::new();
//! let src = builder.add_node(NodeSpec::fixed("source", m(221.0)));
//! let m1 = builder.add_node(NodeSpec::free("m1", m(219.0), m2(5000.0)));
//! builder.add_gate(GateSpec::new("g1", src, m1, 0.6, m2(1.93)));
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.nodes().len(), 2);
//! assert_eq!(network.gates().len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::{GateSpec, NetworkBuilder, NodeSpec};
pub use error::{NetworkError, NetworkResult};
pub use graph::{Gate, GateEnd, GateLink, Network, Node};
pub use indexing::FreeNodeIndex;
