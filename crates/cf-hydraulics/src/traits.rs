//! Core traits for flow structures.

use crate::error::HydraulicsResult;
use cf_core::units::{Accel, Area, Length, VolumeRate};

/// Water levels on either side of a structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPair {
    pub upstream: Length,
    pub downstream: Length,
}

impl HeadPair {
    pub fn new(upstream: Length, downstream: Length) -> Self {
        Self {
            upstream,
            downstream,
        }
    }

    /// The same structure seen from the other side.
    pub fn swapped(self) -> Self {
        Self {
            upstream: self.downstream,
            downstream: self.upstream,
        }
    }

    /// Head difference `upstream - downstream` in meters.
    pub fn head_difference(&self) -> f64 {
        self.upstream.value - self.downstream.value
    }
}

/// A structure connecting an upstream node to a downstream node.
///
/// Structures are deterministic functions of levels and parameters, suitable for
/// parallel evaluation and network solving.
pub trait FlowStructure: Send + Sync {
    /// Structure name for debugging and identification.
    fn name(&self) -> &str;

    /// Compute volumetric flow from upstream to downstream given both levels.
    ///
    /// Positive flow means upstream → downstream. Negative flow means the head
    /// difference has reversed.
    fn flow(&self, heads: HeadPair, g: Accel) -> HydraulicsResult<VolumeRate>;

    /// Area currently open to flow.
    fn effective_area(&self) -> Area;
}
