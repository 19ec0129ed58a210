//! Common utilities for hydraulic calculations.

use crate::error::{HydraulicsError, HydraulicsResult};
use cf_core::numeric::ensure_finite;

/// Head differences below this are treated as level (m).
pub const EPSILON_HEAD: f64 = 1e-6;

/// Ensure a computed value is finite, returning NonPhysical if not.
pub fn check_finite(value: f64, what: &'static str) -> HydraulicsResult<()> {
    ensure_finite(value, what).map_err(|_| HydraulicsError::NonPhysical { what })?;
    Ok(())
}

/// Determine flow direction: 1.0 for forward (upstream higher), -1.0 for reverse.
///
/// Returns 0.0 if the head difference is negligible.
pub fn flow_direction(h_upstream: f64, h_downstream: f64) -> f64 {
    let dh = h_upstream - h_downstream;
    if dh.abs() < EPSILON_HEAD {
        0.0
    } else if dh > 0.0 {
        1.0
    } else {
        -1.0
    }
}
