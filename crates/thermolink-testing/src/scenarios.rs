//! Snapshot builder and bridge harness
//!
//! Provides a fluent API for building thermostat snapshots and a harness that
//! wires a [`ThermostatBridge`] to a [`SimulatedThermostat`] and a point cache.

use std::sync::Arc;
use std::time::Duration;

use thermolink_bridge::{MemoryPointCache, PointCache, StateCache, StateSource, ThermostatBridge};
use thermolink_core::config::namespaces;
use thermolink_core::{
    CapabilityState, RemoteValue, Snapshot, Temperature, TemperatureScale, ThermostatMode,
};

use crate::device_simulator::SimulatedThermostat;

/// Device id used by harnesses unless overridden.
pub const TEST_DEVICE_ID: &str = "thermostat-1";

/// Builder for thermostat snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    states: Vec<CapabilityState>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current temperature reading.
    pub fn current(self, magnitude: f64, scale: TemperatureScale) -> Self {
        self.with(
            namespaces::TEMPERATURE_SENSOR,
            "temperature",
            Temperature::new(magnitude, scale),
        )
    }

    pub fn mode(self, mode: &str) -> Self {
        self.with(
            namespaces::THERMOSTAT_CONTROLLER,
            namespaces::names::THERMOSTAT_MODE,
            ThermostatMode::parse(mode),
        )
    }

    pub fn target(self, magnitude: f64, scale: TemperatureScale) -> Self {
        self.with(
            namespaces::THERMOSTAT_CONTROLLER,
            namespaces::names::TARGET_SETPOINT,
            Temperature::new(magnitude, scale),
        )
    }

    /// Heat setpoint (`lowerSetpoint`).
    pub fn lower(self, magnitude: f64, scale: TemperatureScale) -> Self {
        self.with(
            namespaces::THERMOSTAT_CONTROLLER,
            namespaces::names::LOWER_SETPOINT,
            Temperature::new(magnitude, scale),
        )
    }

    /// Cool setpoint (`upperSetpoint`).
    pub fn upper(self, magnitude: f64, scale: TemperatureScale) -> Self {
        self.with(
            namespaces::THERMOSTAT_CONTROLLER,
            namespaces::names::UPPER_SETPOINT,
            Temperature::new(magnitude, scale),
        )
    }

    /// Arbitrary entry.
    pub fn with(
        mut self,
        namespace: &str,
        name: &str,
        value: impl Into<RemoteValue>,
    ) -> Self {
        self.states.push(CapabilityState::new(namespace, name, value));
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot::new(self.states)
    }

    /// Heating thermostat in Celsius: 21.5 current, 22 target, 20..24 range.
    pub fn heating_celsius() -> Self {
        Self::new()
            .current(21.5, TemperatureScale::Celsius)
            .mode("HEAT")
            .target(22.0, TemperatureScale::Celsius)
            .lower(20.0, TemperatureScale::Celsius)
            .upper(24.0, TemperatureScale::Celsius)
    }
}

/// Bridge wired to a simulator and a point cache.
pub struct BridgeHarness {
    pub bridge: ThermostatBridge,
    pub remote: Arc<SimulatedThermostat>,
    pub cache: Arc<dyn PointCache>,
    memory: Option<Arc<MemoryPointCache>>,
}

impl BridgeHarness {
    /// Harness whose point cache starts as a copy of `snapshot`, as if the
    /// external cache had just been refreshed.
    pub fn new(snapshot: Snapshot) -> Self {
        let remote = Arc::new(SimulatedThermostat::new(snapshot.clone()));
        let memory = Arc::new(MemoryPointCache::from_snapshot(snapshot));
        let cache: Arc<dyn PointCache> = memory.clone();
        let bridge = ThermostatBridge::new(
            TEST_DEVICE_ID,
            remote.clone(),
            remote.clone(),
            cache.clone(),
        );
        Self {
            bridge,
            remote,
            cache,
            memory: Some(memory),
        }
    }

    /// Harness reading through a [`StateCache`]; the point cache is empty
    /// until the first fetch.
    pub fn with_state_cache(snapshot: Snapshot, ttl: Duration) -> (Self, Arc<StateCache>) {
        let remote = Arc::new(SimulatedThermostat::new(snapshot));
        let upstream: Arc<dyn StateSource> = remote.clone();
        let state_cache = Arc::new(StateCache::new(upstream, ttl));
        let cache: Arc<dyn PointCache> = Arc::new(state_cache.point_cache(TEST_DEVICE_ID));
        let bridge = ThermostatBridge::new(
            TEST_DEVICE_ID,
            state_cache.clone(),
            remote.clone(),
            cache.clone(),
        );
        let harness = Self {
            bridge,
            remote,
            cache,
            memory: None,
        };
        (harness, state_cache)
    }

    /// Current point-cache contents, for harnesses built with [`Self::new`].
    pub fn cached(&self) -> Option<Snapshot> {
        self.memory.as_ref().map(|m| m.snapshot())
    }
}
