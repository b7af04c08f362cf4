//! Configuration defaults and fixed contract constants.
//!
//! Namespaces, channel ranges and precision are dictated by the two external
//! models and are not configurable. Only the bridge's own operating knobs
//! (device id, cache TTL, log format) live in [`BridgeConfig`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Remote namespaces and capability names.
pub mod namespaces {
    pub const TEMPERATURE_SENSOR: &str = "Alexa.TemperatureSensor";
    pub const THERMOSTAT_CONTROLLER: &str = "Alexa.ThermostatController";

    pub mod names {
        pub const THERMOSTAT_MODE: &str = "thermostatMode";
        pub const TARGET_SETPOINT: &str = "targetSetpoint";
        pub const UPPER_SETPOINT: &str = "upperSetpoint";
        pub const LOWER_SETPOINT: &str = "lowerSetpoint";
    }

    /// Remote action used for every temperature write.
    pub const SET_TARGET_TEMPERATURE: &str = "setTargetTemperature";
}

/// Per-channel local ranges accepted by the accessory framework.
pub mod ranges {
    use crate::channel::ChannelRange;

    pub const CURRENT: ChannelRange = ChannelRange::UNBOUNDED;
    pub const TARGET: ChannelRange = ChannelRange::new(10.0, 38.0);
    pub const COOL: ChannelRange = ChannelRange::new(10.0, 35.0);
    pub const HEAT: ChannelRange = ChannelRange::new(0.0, 25.0);
}

/// Rounding applied at the model boundaries.
pub mod precision {
    /// Local temperatures are reported in tenths of a degree.
    pub const LOCAL_DECIMALS: i32 = 1;
    /// Outbound remote magnitudes are sent in tenths of a degree.
    pub const REMOTE_DECIMALS: i32 = 1;
}

/// Environment variable names.
pub mod env_vars {
    pub const DEVICE_ID: &str = "THERMOLINK_DEVICE_ID";
    pub const CACHE_TTL_SECS: &str = "THERMOLINK_CACHE_TTL_SECS";
    pub const LOG_JSON: &str = "THERMOLINK_LOG_JSON";
}

/// Default operating values.
pub mod defaults {
    pub const DEVICE_ID: &str = "thermostat";
    pub const CACHE_TTL_SECS: u64 = 60;
}

/// Bridge operating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Remote device identifier used for every fetch and command
    #[serde(default = "default_device_id")]
    pub device_id: String,

    /// Lifetime of a cached snapshot before it is refetched
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub log_json: bool,
}

fn default_device_id() -> String {
    defaults::DEVICE_ID.to_string()
}

fn default_cache_ttl() -> u64 {
    defaults::CACHE_TTL_SECS
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_id: default_device_id(),
            cache_ttl_secs: default_cache_ttl(),
            log_json: false,
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden by any set environment variables. Unparseable
    /// numeric or boolean values fall back to the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(id) = std::env::var(env_vars::DEVICE_ID) {
            config.device_id = id;
        }
        if let Some(ttl) = std::env::var(env_vars::CACHE_TTL_SECS)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.cache_ttl_secs = ttl;
        }
        if let Some(json) = std::env::var(env_vars::LOG_JSON)
            .ok()
            .and_then(|s| parse_bool(&s))
        {
            config.log_json = json;
        }
        config
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.device_id.trim().is_empty() {
            return Err(Error::Config("device_id must not be empty".to_string()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(Error::Config("cache_ttl_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
