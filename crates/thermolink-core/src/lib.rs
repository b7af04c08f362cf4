//! Core types for the Thermolink thermostat bridge.
//!
//! This crate defines the two data models the bridge translates between:
//!
//! - **Remote model**: capability states reported by the cloud smart-home API as
//!   flat `(namespace, name, value)` triples ([`CapabilityState`], [`Snapshot`]).
//! - **Local model**: discrete accessory characteristics ([`LogicalChannel`],
//!   [`LocalMode`], [`LocalUnits`], [`CharacteristicValue`]).
//!
//! Translation logic lives in `thermolink-bridge`; this crate only carries the
//! vocabulary, the fixed channel ranges, and configuration.

pub mod capability;
pub mod channel;
pub mod config;
pub mod error;

pub use capability::{
    CapabilityKey, CapabilityState, RemoteValue, Snapshot, Temperature, TemperatureScale,
    ThermostatMode,
};
pub use channel::{
    ChannelAccess, ChannelRange, CharacteristicValue, CurrentHeatingCoolingState, LocalMode,
    LocalUnits, LogicalChannel,
};
pub use config::BridgeConfig;
pub use error::{Error, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::capability::{
        CapabilityKey, CapabilityState, RemoteValue, Snapshot, Temperature, TemperatureScale,
        ThermostatMode,
    };
    pub use crate::channel::{
        ChannelRange, CharacteristicValue, LocalMode, LocalUnits, LogicalChannel,
    };
    pub use crate::config::{namespaces, ranges, BridgeConfig};
    pub use crate::error::{Error, Result};
}
