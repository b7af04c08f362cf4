//! Local accessory model: logical channels, their ranges, and host values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityKey;
use crate::config::ranges;
use crate::error::Error;

/// Inclusive `[min, max]` bound for a numeric channel, in local units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRange {
    pub min: f64,
    pub max: f64,
}

impl ChannelRange {
    pub const UNBOUNDED: Self = Self::new(f64::NEG_INFINITY, f64::INFINITY);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == f64::NEG_INFINITY && self.max == f64::INFINITY
    }
}

impl fmt::Display for ChannelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str("unbounded")
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}

/// Read/write capability of a channel as exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAccess {
    ReadOnly,
    ReadWrite,
}

/// One user-visible thermostat property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalChannel {
    CurrentTemperature,
    TargetTemperature,
    CoolThreshold,
    HeatThreshold,
    Mode,
    Units,
    CurrentHeatingCoolingState,
}

impl LogicalChannel {
    pub const ALL: &'static [LogicalChannel] = &[
        LogicalChannel::CurrentTemperature,
        LogicalChannel::TargetTemperature,
        LogicalChannel::CoolThreshold,
        LogicalChannel::HeatThreshold,
        LogicalChannel::Mode,
        LogicalChannel::Units,
        LogicalChannel::CurrentHeatingCoolingState,
    ];

    /// Remote slot backing this channel. The heating/cooling state has none.
    pub fn key(&self) -> Option<CapabilityKey> {
        match self {
            Self::CurrentTemperature | Self::Units => Some(CapabilityKey::TEMPERATURE_SENSOR),
            Self::TargetTemperature => Some(CapabilityKey::TARGET_SETPOINT),
            Self::CoolThreshold => Some(CapabilityKey::UPPER_SETPOINT),
            Self::HeatThreshold => Some(CapabilityKey::LOWER_SETPOINT),
            Self::Mode => Some(CapabilityKey::THERMOSTAT_MODE),
            Self::CurrentHeatingCoolingState => None,
        }
    }

    /// Numeric range for temperature channels.
    pub fn range(&self) -> Option<ChannelRange> {
        match self {
            Self::CurrentTemperature => Some(ranges::CURRENT),
            Self::TargetTemperature => Some(ranges::TARGET),
            Self::CoolThreshold => Some(ranges::COOL),
            Self::HeatThreshold => Some(ranges::HEAT),
            Self::Mode | Self::Units | Self::CurrentHeatingCoolingState => None,
        }
    }

    pub fn access(&self) -> ChannelAccess {
        match self {
            Self::TargetTemperature | Self::CoolThreshold | Self::HeatThreshold => {
                ChannelAccess::ReadWrite
            }
            _ => ChannelAccess::ReadOnly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentTemperature => "current-temperature",
            Self::TargetTemperature => "target-temperature",
            Self::CoolThreshold => "cool-threshold",
            Self::HeatThreshold => "heat-threshold",
            Self::Mode => "mode",
            Self::Units => "units",
            Self::CurrentHeatingCoolingState => "current-state",
        }
    }
}

impl fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| Error::UnknownChannel(s.to_string()))
    }
}

/// Local target heating/cooling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LocalMode {
    Off = 0,
    Heat = 1,
    Cool = 2,
    Auto = 3,
}

impl LocalMode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Local temperature display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LocalUnits {
    Celsius = 0,
    Fahrenheit = 1,
}

impl LocalUnits {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Local current heating/cooling state. The remote API does not report one,
/// so the bridge always answers `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CurrentHeatingCoolingState {
    Off = 0,
    Heat = 1,
    Cool = 2,
}

impl CurrentHeatingCoolingState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Value handed to a set callback by the host framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CharacteristicValue {
    /// Finite numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for CharacteristicValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for CharacteristicValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}
