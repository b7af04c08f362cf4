//! Remote capability-state model.
//!
//! The cloud API reports a device as a flat list of capability states, each
//! identified by a `(namespace, name)` pair. Values are either a temperature
//! with an explicit scale, a plain enumerated string (thermostat mode), or some
//! other JSON shape that belongs to a capability this bridge does not handle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::namespaces;

/// Temperature scale tag carried by every remote temperature.
///
/// Parsing is case-insensitive. Unrecognised tags are preserved verbatim so a
/// snapshot still deserialises, but mappers treat them as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
    Kelvin,
    Other(String),
}

impl TemperatureScale {
    /// Parse from a wire tag.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "CELSIUS" => Self::Celsius,
            "FAHRENHEIT" => Self::Fahrenheit,
            "KELVIN" => Self::Kelvin,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Upper-case tag as stored in capability states.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Celsius => "CELSIUS",
            Self::Fahrenheit => "FAHRENHEIT",
            Self::Kelvin => "KELVIN",
            Self::Other(s) => s,
        }
    }

    /// Lower-case tag as sent in command parameters.
    pub fn as_param(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Whether the bridge knows how to convert this scale.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for TemperatureScale {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TemperatureScale> for String {
    fn from(scale: TemperatureScale) -> Self {
        scale.as_str().to_string()
    }
}

impl fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote temperature reading or setpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    /// Magnitude in `scale` units
    #[serde(rename = "value")]
    pub magnitude: f64,
    /// Unit tag
    pub scale: TemperatureScale,
}

impl Temperature {
    pub fn new(magnitude: f64, scale: TemperatureScale) -> Self {
        Self { magnitude, scale }
    }

    pub fn celsius(magnitude: f64) -> Self {
        Self::new(magnitude, TemperatureScale::Celsius)
    }

    pub fn fahrenheit(magnitude: f64) -> Self {
        Self::new(magnitude, TemperatureScale::Fahrenheit)
    }

    /// A temperature the bridge can compute with: finite magnitude, known scale.
    pub fn is_valid(&self) -> bool {
        self.magnitude.is_finite() && self.scale.is_recognized()
    }
}

/// Remote thermostat mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ThermostatMode {
    Auto,
    Heat,
    Cool,
    Eco,
    Off,
    Custom,
    Unknown(String),
}

impl ThermostatMode {
    /// Parse from the remote mode string. Matching is exact, as the remote
    /// enumeration is upper-case.
    pub fn parse(s: &str) -> Self {
        match s {
            "AUTO" => Self::Auto,
            "HEAT" => Self::Heat,
            "COOL" => Self::Cool,
            "ECO" => Self::Eco,
            "OFF" => Self::Off,
            "CUSTOM" => Self::Custom,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "AUTO",
            Self::Heat => "HEAT",
            Self::Cool => "COOL",
            Self::Eco => "ECO",
            Self::Off => "OFF",
            Self::Custom => "CUSTOM",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for ThermostatMode {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ThermostatMode> for String {
    fn from(mode: ThermostatMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for ThermostatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a single capability state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteValue {
    /// `{"value": 21.5, "scale": "CELSIUS"}`
    Temperature(Temperature),
    /// Enumerated string such as a thermostat mode
    Text(String),
    /// Any other shape, kept opaque
    Other(serde_json::Value),
}

impl RemoteValue {
    pub fn as_temperature(&self) -> Option<&Temperature> {
        match self {
            Self::Temperature(t) => Some(t),
            _ => None,
        }
    }

    /// Temperature that passes [`Temperature::is_valid`].
    pub fn valid_temperature(&self) -> Option<&Temperature> {
        self.as_temperature().filter(|t| t.is_valid())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mode(&self) -> Option<ThermostatMode> {
        self.as_text().map(ThermostatMode::parse)
    }
}

impl From<Temperature> for RemoteValue {
    fn from(t: Temperature) -> Self {
        Self::Temperature(t)
    }
}

impl From<ThermostatMode> for RemoteValue {
    fn from(mode: ThermostatMode) -> Self {
        Self::Text(mode.into())
    }
}

/// One entry of a device's reported state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityState {
    pub namespace: String,
    pub name: String,
    pub value: RemoteValue,
}

impl CapabilityState {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<RemoteValue>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether both entries address the same `(namespace, name)` slot.
    pub fn same_slot(&self, other: &CapabilityState) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

/// Lookup key for a capability state.
///
/// `name: None` matches any entry in the namespace; the temperature sensor is
/// addressed that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
    pub namespace: &'static str,
    pub name: Option<&'static str>,
}

impl CapabilityKey {
    pub const TEMPERATURE_SENSOR: Self = Self::namespace_only(namespaces::TEMPERATURE_SENSOR);
    pub const THERMOSTAT_MODE: Self =
        Self::new(namespaces::THERMOSTAT_CONTROLLER, namespaces::names::THERMOSTAT_MODE);
    pub const TARGET_SETPOINT: Self =
        Self::new(namespaces::THERMOSTAT_CONTROLLER, namespaces::names::TARGET_SETPOINT);
    pub const UPPER_SETPOINT: Self =
        Self::new(namespaces::THERMOSTAT_CONTROLLER, namespaces::names::UPPER_SETPOINT);
    pub const LOWER_SETPOINT: Self =
        Self::new(namespaces::THERMOSTAT_CONTROLLER, namespaces::names::LOWER_SETPOINT);

    pub const fn new(namespace: &'static str, name: &'static str) -> Self {
        Self {
            namespace,
            name: Some(name),
        }
    }

    pub const fn namespace_only(namespace: &'static str) -> Self {
        Self {
            namespace,
            name: None,
        }
    }

    pub fn matches(&self, state: &CapabilityState) -> bool {
        state.namespace == self.namespace && self.name.map_or(true, |n| state.name == n)
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name.unwrap_or("*"))
    }
}

/// Grouped state snapshot for one device, in the order the source produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Vec<CapabilityState>);

impl Snapshot {
    pub fn new(states: Vec<CapabilityState>) -> Self {
        Self(states)
    }

    /// First entry matching `key`.
    pub fn find(&self, key: CapabilityKey) -> Option<&CapabilityState> {
        self.0.iter().find(|s| key.matches(s))
    }

    /// Replace the first entry in the same slot, or append.
    pub fn upsert(&mut self, state: CapabilityState) {
        match self.0.iter_mut().find(|s| s.same_slot(&state)) {
            Some(existing) => *existing = state,
            None => self.0.push(state),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityState> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<CapabilityState> {
        self.0
    }
}

impl From<Vec<CapabilityState>> for Snapshot {
    fn from(states: Vec<CapabilityState>) -> Self {
        Self(states)
    }
}

impl FromIterator<CapabilityState> for Snapshot {
    fn from_iter<I: IntoIterator<Item = CapabilityState>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
