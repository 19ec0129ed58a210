//! cf-hydraulics: flow and storage laws for canal networks.
//!
//! Provides:
//! - Sluice gates with the orifice discharge relation, allowing reverse flow
//! - The storage relaxation update that turns a flow imbalance into a level change
//!
//! Everything here is a pure function of its inputs, suitable for
//! evaluation from a shared level snapshot.
//!
//! # Example
//!
//! ```
//! use cf_core::units::{constants, m, m2};
//! use cf_hydraulics::{FlowStructure, HeadPair, SluiceGate};
//!
//! let gate = SluiceGate::new("g1", 0.6, m2(1.93), 1.0).unwrap();
//! let q = gate
//!     .flow(HeadPair::new(m(221.0), m(219.0)), constants::g())
//!     .unwrap();
//! assert!(q.value > 0.0);
//! ```

pub mod common;
pub mod error;
pub mod gate;
pub mod storage;
pub mod traits;

// Re-exports
pub use error::{HydraulicsError, HydraulicsResult};
pub use gate::{SluiceGate, gate_flow};
pub use storage::{imbalance_resolution, level_delta, node_update};
pub use traits::{FlowStructure, HeadPair};
