//! Mode guard.
//!
//! Two deliberately asymmetric predicates over the cached thermostat mode:
//!
//! - [`is_in_auto_or_invalid_mode`] gates direct target-temperature writes and
//!   treats a missing mode as AUTO.
//! - [`is_in_auto_mode`] gates the derived path for threshold reads and needs
//!   an explicit AUTO.

use thermolink_core::{CapabilityKey, ThermostatMode};

use crate::ports::PointCache;

/// Cached mode entry, parsed. Outer `None`: no entry. Inner `None`: the entry
/// is not a mode string.
pub fn cached_mode(cache: &dyn PointCache) -> Option<Option<ThermostatMode>> {
    cache
        .get(CapabilityKey::THERMOSTAT_MODE)
        .map(|state| state.value.as_mode())
}

/// `true` when the mode entry is absent or AUTO.
pub fn is_in_auto_or_invalid_mode(cache: &dyn PointCache) -> bool {
    match cached_mode(cache) {
        None => true,
        Some(mode) => mode == Some(ThermostatMode::Auto),
    }
}

/// `true` only when the mode entry is present and AUTO.
pub fn is_in_auto_mode(cache: &dyn PointCache) -> bool {
    matches!(cached_mode(cache), Some(Some(ThermostatMode::Auto)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryPointCache;
    use thermolink_core::{CapabilityState, Temperature};

    fn with_mode(value: Option<&str>) -> MemoryPointCache {
        let cache = MemoryPointCache::default();
        if let Some(mode) = value {
            cache.set(CapabilityState::new(
                "Alexa.ThermostatController",
                "thermostatMode",
                ThermostatMode::parse(mode),
            ));
        }
        cache
    }

    #[test]
    fn test_absent_mode() {
        let cache = with_mode(None);
        assert!(is_in_auto_or_invalid_mode(&cache));
        assert!(!is_in_auto_mode(&cache));
    }

    #[test]
    fn test_auto_mode() {
        let cache = with_mode(Some("AUTO"));
        assert!(is_in_auto_or_invalid_mode(&cache));
        assert!(is_in_auto_mode(&cache));
    }

    #[test]
    fn test_concrete_modes() {
        for mode in ["HEAT", "COOL", "OFF", "ECO", "CUSTOM", "SOMETHING_NEW"] {
            let cache = with_mode(Some(mode));
            assert!(!is_in_auto_or_invalid_mode(&cache), "{mode}");
            assert!(!is_in_auto_mode(&cache), "{mode}");
        }
    }

    #[test]
    fn test_non_string_mode_entry() {
        let cache = MemoryPointCache::default();
        cache.set(CapabilityState::new(
            "Alexa.ThermostatController",
            "thermostatMode",
            Temperature::celsius(20.0),
        ));
        assert_eq!(cached_mode(&cache), Some(None));
        assert!(!is_in_auto_or_invalid_mode(&cache));
        assert!(!is_in_auto_mode(&cache));
    }
}
