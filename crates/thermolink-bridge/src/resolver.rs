//! Derived-value resolver.
//!
//! In AUTO mode the device keeps separate heat and cool setpoints; the local
//! model wants a single target. The target is their midpoint in local units.

use thermolink_core::{CapabilityKey, Temperature};

use crate::mapper::map_remote_temp_to_local;
use crate::ports::PointCache;

/// Midpoint of two remote setpoints in local units.
///
/// `None` if either is not a valid temperature.
pub fn midpoint(heat: &Temperature, cool: &Temperature) -> Option<f64> {
    if !heat.is_valid() || !cool.is_valid() {
        return None;
    }
    let heat = map_remote_temp_to_local(heat)?;
    let cool = map_remote_temp_to_local(cool)?;
    Some((heat + cool) / 2.0)
}

/// Auto-mode target from the cached lower/upper setpoints.
pub fn derive_auto_target(cache: &dyn PointCache) -> Option<f64> {
    let heat = cache.get(CapabilityKey::LOWER_SETPOINT)?;
    let cool = cache.get(CapabilityKey::UPPER_SETPOINT)?;
    midpoint(heat.value.as_temperature()?, cool.value.as_temperature()?)
}
