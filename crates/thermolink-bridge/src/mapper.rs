//! Value mappers between the remote and local models.
//!
//! All functions are pure. Fallible mappings return `None`; the mode mapping
//! always yields a local mode because the host only accepts its fixed set.

use thermolink_core::config::precision;
use thermolink_core::{LocalMode, LocalUnits, RemoteValue, Temperature, TemperatureScale, ThermostatMode};

const KELVIN_OFFSET: f64 = 273.15;

/// Round to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Remote temperature → local (Celsius) value, rounded to display precision.
///
/// `None` if the scale is unrecognised or the magnitude is not finite.
pub fn map_remote_temp_to_local(value: &Temperature) -> Option<f64> {
    if !value.magnitude.is_finite() {
        return None;
    }
    let celsius = match value.scale {
        TemperatureScale::Celsius => value.magnitude,
        TemperatureScale::Fahrenheit => (value.magnitude - 32.0) * 5.0 / 9.0,
        TemperatureScale::Kelvin => value.magnitude - KELVIN_OFFSET,
        TemperatureScale::Other(_) => return None,
    };
    Some(round_to(celsius, precision::LOCAL_DECIMALS))
}

/// Local (Celsius) value → magnitude in `scale`.
///
/// An unrecognised scale passes the value through unchanged; callers only
/// reach this with a scale taken from a valid remote temperature.
pub fn map_local_temp_to_remote(value: f64, scale: &TemperatureScale) -> f64 {
    let remote = match scale {
        TemperatureScale::Celsius | TemperatureScale::Other(_) => value,
        TemperatureScale::Fahrenheit => value * 9.0 / 5.0 + 32.0,
        TemperatureScale::Kelvin => value + KELVIN_OFFSET,
    };
    round_to(remote, precision::REMOTE_DECIMALS)
}

/// Remote temperature's scale → local display units.
///
/// Kelvin has no local counterpart; local values are Celsius-equivalent, so it
/// is shown as Celsius.
pub fn map_remote_temp_units_to_local(value: &RemoteValue) -> Option<LocalUnits> {
    match value.as_temperature()?.scale {
        TemperatureScale::Celsius | TemperatureScale::Kelvin => Some(LocalUnits::Celsius),
        TemperatureScale::Fahrenheit => Some(LocalUnits::Fahrenheit),
        TemperatureScale::Other(_) => None,
    }
}

/// Remote mode → local target heating/cooling state. Anything without a
/// direct counterpart becomes `Off`.
pub fn map_remote_mode_to_local(value: &RemoteValue) -> LocalMode {
    match value.as_mode() {
        Some(ThermostatMode::Heat) => LocalMode::Heat,
        Some(ThermostatMode::Cool) => LocalMode::Cool,
        Some(ThermostatMode::Auto) => LocalMode::Auto,
        Some(ThermostatMode::Off)
        | Some(ThermostatMode::Eco)
        | Some(ThermostatMode::Custom)
        | Some(ThermostatMode::Unknown(_))
        | None => LocalMode::Off,
    }
}

/// Decimal encoding for command parameters.
pub fn format_remote_magnitude(value: f64) -> String {
    // Rust's float Display is the shortest string that parses back to `value`.
    format!("{}", value)
}
