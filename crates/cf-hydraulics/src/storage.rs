//! Storage relaxation: converting a nodal flow imbalance into a level correction.
//!
//! `H' = H + I · dt_relax / S`. `dt_relax` is a numerical tuning step, not
//! physical time; it trades convergence speed for stability.

use crate::common::check_finite;
use crate::error::HydraulicsResult;
use cf_core::numeric::{ensure_finite, ensure_positive};
use cf_core::units::{Area, Length, Time, VolumeRate, m};

/// Level change produced by an imbalance over one relaxation step.
pub fn level_delta(
    imbalance: VolumeRate,
    storage_area: Area,
    dt_relax: Time,
) -> HydraulicsResult<Length> {
    let s = ensure_positive(storage_area.value, "storage_area")?;
    let dt = ensure_positive(dt_relax.value, "dt_relax")?;
    let i = ensure_finite(imbalance.value, "imbalance")?;

    let dh = i * dt / s;
    check_finite(dh, "level delta")?;
    Ok(m(dh))
}

/// New level of a free node after one relaxation step.
///
/// `imbalance` is `Σ inflow - Σ outflow` over all gates touching the node.
pub fn node_update(
    level: Length,
    imbalance: VolumeRate,
    storage_area: Area,
    dt_relax: Time,
) -> HydraulicsResult<Length> {
    let h = ensure_finite(level.value, "level")?;
    let dh = level_delta(imbalance, storage_area, dt_relax)?;
    Ok(m(h + dh.value))
}

/// Smallest imbalance the update can resolve at a given level tolerance.
///
/// A converged node satisfies `|I| < tolerance · S / dt_relax`.
pub fn imbalance_resolution(tolerance: Length, storage_area: Area, dt_relax: Time) -> VolumeRate {
    cf_core::units::m3ps(tolerance.value * storage_area.value / dt_relax.value)
}
