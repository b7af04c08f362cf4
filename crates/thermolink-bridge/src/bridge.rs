//! State bridge: per-channel read and write orchestration.
//!
//! Reads fetch the grouped snapshot, locate the channel's entry, map and clamp
//! it. Target and threshold reads may be answered from the derived auto-mode
//! midpoint instead, depending on the mode guard.
//!
//! Writes read companion entries from the point cache, clamp the input,
//! convert it to the remote scale, issue one remote command, and on success
//! record the new value in the point cache under the slot just written.

use std::sync::Arc;

use serde::Serialize;
use thermolink_core::config::namespaces;
use thermolink_core::{
    CapabilityKey, CapabilityState, CharacteristicValue, CurrentHeatingCoolingState, LocalMode,
    LocalUnits, LogicalChannel, RemoteValue, Snapshot, Temperature,
};
use tracing::{debug, error, warn};

use crate::clamp::clamp_channel;
use crate::error::{BridgeError, BridgeResult, HostFault};
use crate::guard;
use crate::mapper;
use crate::ports::{CommandParams, CommandSink, PointCache, StateSource};
use crate::resolver;

/// Remote operations a device must support to be bridged as a thermostat.
pub const REQUIRED_OPERATIONS: &[&str] = &[namespaces::SET_TARGET_TEMPERATURE];

/// Whether a device's supported operations cover [`REQUIRED_OPERATIONS`].
pub fn is_thermostat_capable<S: AsRef<str>>(supported_operations: &[S]) -> bool {
    REQUIRED_OPERATIONS
        .iter()
        .all(|required| supported_operations.iter().any(|op| op.as_ref() == *required))
}

/// Value returned by a channel read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChannelValue {
    Temperature(f64),
    Mode(LocalMode),
    Units(LocalUnits),
    State(CurrentHeatingCoolingState),
}

impl ChannelValue {
    /// Numeric form handed to the host: temperatures as-is, enumerations as
    /// their discriminant.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Temperature(t) => *t,
            Self::Mode(m) => f64::from(m.as_u8()),
            Self::Units(u) => f64::from(u.as_u8()),
            Self::State(s) => f64::from(s.as_u8()),
        }
    }
}

/// Which guard, if any, lets a temperature read use the derived midpoint.
type DeriveGuard = fn(&dyn PointCache) -> bool;

/// Parameters of one side of a two-bound threshold write.
struct ThresholdWrite {
    channel: LogicalChannel,
    own_key: CapabilityKey,
    own_field: &'static str,
    paired_key: CapabilityKey,
    paired_field: &'static str,
}

const COOL_WRITE: ThresholdWrite = ThresholdWrite {
    channel: LogicalChannel::CoolThreshold,
    own_key: CapabilityKey::UPPER_SETPOINT,
    own_field: "upperSetTemperature",
    paired_key: CapabilityKey::LOWER_SETPOINT,
    paired_field: "lowerSetTemperature",
};

const HEAT_WRITE: ThresholdWrite = ThresholdWrite {
    channel: LogicalChannel::HeatThreshold,
    own_key: CapabilityKey::LOWER_SETPOINT,
    own_field: "lowerSetTemperature",
    paired_key: CapabilityKey::UPPER_SETPOINT,
    paired_field: "upperSetTemperature",
};

const TARGET_FIELD: &str = "targetTemperature";

/// Bridge between one remote thermostat and the local accessory channels.
pub struct ThermostatBridge {
    device_id: String,
    source: Arc<dyn StateSource>,
    sink: Arc<dyn CommandSink>,
    cache: Arc<dyn PointCache>,
}

impl ThermostatBridge {
    pub fn new(
        device_id: impl Into<String>,
        source: Arc<dyn StateSource>,
        sink: Arc<dyn CommandSink>,
        cache: Arc<dyn PointCache>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            source,
            sink,
            cache,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    // ========== Host callbacks: reads ==========

    pub async fn handle_current_temp_get(&self) -> Result<f64, HostFault> {
        let channel = LogicalChannel::CurrentTemperature;
        self.read_temperature(channel, CapabilityKey::TEMPERATURE_SENSOR, None)
            .await
            .map_err(|e| self.fail(channel, "get", e))
    }

    pub async fn handle_temp_units_get(&self) -> Result<LocalUnits, HostFault> {
        let channel = LogicalChannel::Units;
        let result = self
            .read_snapshot_value(CapabilityKey::TEMPERATURE_SENSOR, |v| {
                mapper::map_remote_temp_units_to_local(v)
            })
            .await;
        self.finish_read(channel, result)
    }

    pub async fn handle_target_state_get(&self) -> Result<LocalMode, HostFault> {
        let channel = LogicalChannel::Mode;
        let result = self
            .read_snapshot_value(CapabilityKey::THERMOSTAT_MODE, |v| {
                Some(mapper::map_remote_mode_to_local(v))
            })
            .await;
        self.finish_read(channel, result)
    }

    /// The remote API reports no live heating/cooling activity.
    pub fn handle_current_state_get(&self) -> CurrentHeatingCoolingState {
        CurrentHeatingCoolingState::Off
    }

    pub async fn handle_target_temp_get(&self) -> Result<f64, HostFault> {
        let channel = LogicalChannel::TargetTemperature;
        self.read_temperature(
            channel,
            CapabilityKey::TARGET_SETPOINT,
            Some(guard::is_in_auto_or_invalid_mode),
        )
            .await
            .map_err(|e| self.fail(channel, "get", e))
    }

    pub async fn handle_cool_temp_get(&self) -> Result<f64, HostFault> {
        let channel = LogicalChannel::CoolThreshold;
        self.read_temperature(channel, CapabilityKey::UPPER_SETPOINT, Some(guard::is_in_auto_mode))
            .await
            .map_err(|e| self.fail(channel, "get", e))
    }

    pub async fn handle_heat_temp_get(&self) -> Result<f64, HostFault> {
        let channel = LogicalChannel::HeatThreshold;
        self.read_temperature(channel, CapabilityKey::LOWER_SETPOINT, Some(guard::is_in_auto_mode))
            .await
            .map_err(|e| self.fail(channel, "get", e))
    }

    // ========== Host callbacks: writes ==========

    pub async fn handle_target_temp_set(&self, value: CharacteristicValue) -> Result<(), HostFault> {
        let channel = LogicalChannel::TargetTemperature;
        self.write_target(&value)
            .await
            .map_err(|e| self.fail(channel, "set", e))
    }

    pub async fn handle_cool_temp_set(&self, value: CharacteristicValue) -> Result<(), HostFault> {
        self.write_threshold(&COOL_WRITE, &value)
            .await
            .map_err(|e| self.fail(COOL_WRITE.channel, "set", e))
    }

    pub async fn handle_heat_temp_set(&self, value: CharacteristicValue) -> Result<(), HostFault> {
        self.write_threshold(&HEAT_WRITE, &value)
            .await
            .map_err(|e| self.fail(HEAT_WRITE.channel, "set", e))
    }

    pub fn handle_target_state_set(&self, _value: CharacteristicValue) -> Result<(), HostFault> {
        let channel = LogicalChannel::Mode;
        Err(self.fail(channel, "set", BridgeError::ReadOnly { channel }))
    }

    pub fn handle_temp_units_set(&self, _value: CharacteristicValue) -> Result<(), HostFault> {
        let channel = LogicalChannel::Units;
        Err(self.fail(channel, "set", BridgeError::ReadOnly { channel }))
    }

    // ========== Channel dispatch ==========

    /// Read any channel.
    pub async fn get(&self, channel: LogicalChannel) -> Result<ChannelValue, HostFault> {
        match channel {
            LogicalChannel::CurrentTemperature => {
                self.handle_current_temp_get().await.map(ChannelValue::Temperature)
            }
            LogicalChannel::TargetTemperature => {
                self.handle_target_temp_get().await.map(ChannelValue::Temperature)
            }
            LogicalChannel::CoolThreshold => {
                self.handle_cool_temp_get().await.map(ChannelValue::Temperature)
            }
            LogicalChannel::HeatThreshold => {
                self.handle_heat_temp_get().await.map(ChannelValue::Temperature)
            }
            LogicalChannel::Mode => self.handle_target_state_get().await.map(ChannelValue::Mode),
            LogicalChannel::Units => self.handle_temp_units_get().await.map(ChannelValue::Units),
            LogicalChannel::CurrentHeatingCoolingState => {
                Ok(ChannelValue::State(self.handle_current_state_get()))
            }
        }
    }

    /// Write any channel. Channels the bridge only exposes for reading fail
    /// with [`HostFault::ReadOnlyViolation`].
    pub async fn set(
        &self,
        channel: LogicalChannel,
        value: CharacteristicValue,
    ) -> Result<(), HostFault> {
        match channel {
            LogicalChannel::TargetTemperature => self.handle_target_temp_set(value).await,
            LogicalChannel::CoolThreshold => self.handle_cool_temp_set(value).await,
            LogicalChannel::HeatThreshold => self.handle_heat_temp_set(value).await,
            LogicalChannel::Mode => self.handle_target_state_set(value),
            LogicalChannel::Units => self.handle_temp_units_set(value),
            LogicalChannel::CurrentTemperature | LogicalChannel::CurrentHeatingCoolingState => {
                Err(self.fail(channel, "set", BridgeError::ReadOnly { channel }))
            }
        }
    }

    // ========== Read path ==========

    async fn fetch_snapshot(&self) -> BridgeResult<Snapshot> {
        self.source
            .fetch_snapshot(&self.device_id)
            .await
            .map_err(|source| BridgeError::Fetch {
                device_id: self.device_id.clone(),
                source,
            })
    }

    /// Fetch, locate the first entry for `key`, and map its value.
    async fn read_snapshot_value<T>(
        &self,
        key: CapabilityKey,
        map: impl Fn(&RemoteValue) -> Option<T>,
    ) -> BridgeResult<T> {
        let snapshot = self.fetch_snapshot().await?;
        let state = snapshot
            .find(key)
            .ok_or(BridgeError::MissingState { key })?;
        map(&state.value).ok_or(BridgeError::UnusableState { key })
    }

    /// Temperature read for `channel` from the `key` slot, clamped to the
    /// channel's range.
    ///
    /// The snapshot is always fetched first so the point cache reflects it.
    /// When `derive_when` holds and a midpoint exists, the midpoint wins over
    /// the snapshot value, and over a failed fetch.
    async fn read_temperature(
        &self,
        channel: LogicalChannel,
        key: CapabilityKey,
        derive_when: Option<DeriveGuard>,
    ) -> BridgeResult<f64> {
        let from_snapshot = self
            .read_snapshot_value(key, |v| {
                v.as_temperature().and_then(mapper::map_remote_temp_to_local)
            })
            .await;

        if let Some(applies) = derive_when {
            let cache = self.cache.as_ref();
            if applies(cache) {
                if let Some(derived) = resolver::derive_auto_target(cache) {
                    if let Err(e) = &from_snapshot {
                        warn!(
                            device_id = %self.device_id,
                            channel = %channel,
                            error = %e,
                            "Snapshot read failed, answering with derived value"
                        );
                    }
                    let value = clamp_channel(channel, derived);
                    debug!(device_id = %self.device_id, channel = %channel, value, "Get derived result");
                    return Ok(value);
                }
            }
        }

        let value = clamp_channel(channel, from_snapshot?);
        debug!(device_id = %self.device_id, channel = %channel, value, "Get result");
        Ok(value)
    }

    fn finish_read<T: std::fmt::Debug>(
        &self,
        channel: LogicalChannel,
        result: BridgeResult<T>,
    ) -> Result<T, HostFault> {
        match result {
            Ok(value) => {
                debug!(device_id = %self.device_id, channel = %channel, ?value, "Get result");
                Ok(value)
            }
            Err(e) => Err(self.fail(channel, "get", e)),
        }
    }

    // ========== Write path ==========

    async fn write_target(&self, value: &CharacteristicValue) -> BridgeResult<()> {
        let channel = LogicalChannel::TargetTemperature;
        debug!(device_id = %self.device_id, channel = %channel, %value, "Triggered set");

        let cache = self.cache.as_ref();
        if guard::is_in_auto_or_invalid_mode(cache) {
            return Err(BridgeError::NotAllowed {
                channel,
                reason: "thermostat mode is AUTO or unknown",
            });
        }
        let scale = cache
            .get(CapabilityKey::TEMPERATURE_SENSOR)
            .and_then(|s| s.value.valid_temperature().map(|t| t.scale.clone()))
            .ok_or(BridgeError::NotAllowed {
                channel,
                reason: "no temperature reading to take the active scale from",
            })?;
        let requested = value.as_number().ok_or_else(|| BridgeError::InvalidValue {
            channel,
            value: value.clone(),
        })?;

        let remote = mapper::map_local_temp_to_remote(clamp_channel(channel, requested), &scale);
        let mut params = CommandParams::new();
        insert_temperature(&mut params, TARGET_FIELD, &Temperature::new(remote, scale.clone()));

        self.send(namespaces::SET_TARGET_TEMPERATURE, &params).await?;
        self.cache.set(slot(
            CapabilityKey::TARGET_SETPOINT,
            Temperature::new(remote, scale),
        ));
        Ok(())
    }

    async fn write_threshold(
        &self,
        write: &ThresholdWrite,
        value: &CharacteristicValue,
    ) -> BridgeResult<()> {
        let channel = write.channel;
        debug!(device_id = %self.device_id, channel = %channel, %value, "Triggered set");

        let paired = self
            .cache
            .get(write.paired_key)
            .and_then(|s| s.value.valid_temperature().cloned())
            .ok_or(BridgeError::NotAllowed {
                channel,
                reason: "paired setpoint is missing or not a valid temperature",
            })?;
        let requested = value.as_number().ok_or_else(|| BridgeError::InvalidValue {
            channel,
            value: value.clone(),
        })?;

        let remote = mapper::map_local_temp_to_remote(
            clamp_channel(channel, requested),
            &paired.scale,
        );
        let own = Temperature::new(remote, paired.scale.clone());
        let mut params = CommandParams::new();
        insert_temperature(&mut params, write.own_field, &own);
        insert_temperature(&mut params, write.paired_field, &paired);

        self.send(namespaces::SET_TARGET_TEMPERATURE, &params).await?;
        self.cache.set(slot(write.own_key, own));
        Ok(())
    }

    async fn send(&self, action: &str, params: &CommandParams) -> BridgeResult<()> {
        self.sink
            .set_device_state(&self.device_id, action, params)
            .await
            .map_err(|source| BridgeError::Command {
                device_id: self.device_id.clone(),
                action: action.to_string(),
                source,
            })?;
        debug!(device_id = %self.device_id, action, ?params, "Command accepted");
        Ok(())
    }

    /// Log a bridge error with context and reduce it to a host fault.
    fn fail(&self, channel: LogicalChannel, op: &'static str, err: BridgeError) -> HostFault {
        let fault = err.fault();
        match fault {
            HostFault::CommunicationFailure => error!(
                device_id = %self.device_id,
                channel = %channel,
                op,
                error = %err,
                "Thermostat {} failed", op
            ),
            _ => warn!(
                device_id = %self.device_id,
                channel = %channel,
                op,
                error = %err,
                "Thermostat {} rejected", op
            ),
        }
        fault
    }
}

fn slot(key: CapabilityKey, value: Temperature) -> CapabilityState {
    CapabilityState::new(key.namespace, key.name.unwrap_or_default(), value)
}

fn insert_temperature(params: &mut CommandParams, field: &str, value: &Temperature) {
    params.insert(format!("{}.scale", field), value.scale.as_param());
    params.insert(
        format!("{}.value", field),
        mapper::format_remote_magnitude(value.magnitude),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_thermostat_capable() {
        assert!(is_thermostat_capable(&["turnOn", "setTargetTemperature"]));
        assert!(!is_thermostat_capable(&["turnOn", "turnOff"]));
        assert!(!is_thermostat_capable::<&str>(&[]));
    }

    #[test]
    fn test_channel_value_as_number() {
        assert_eq!(ChannelValue::Temperature(21.5).as_number(), 21.5);
        assert_eq!(ChannelValue::Mode(LocalMode::Cool).as_number(), 2.0);
        assert_eq!(ChannelValue::Units(LocalUnits::Fahrenheit).as_number(), 1.0);
        assert_eq!(ChannelValue::State(CurrentHeatingCoolingState::Off).as_number(), 0.0);
    }

    #[test]
    fn test_insert_temperature_params() {
        let mut params = CommandParams::new();
        insert_temperature(&mut params, "targetTemperature", &Temperature::fahrenheit(71.6));
        assert_eq!(params["targetTemperature.scale"], "fahrenheit");
        assert_eq!(params["targetTemperature.value"], "71.6");
    }

    #[test]
    fn test_temperature_handlers_read_their_channel_slot() {
        for (channel, key) in [
            (LogicalChannel::CurrentTemperature, CapabilityKey::TEMPERATURE_SENSOR),
            (LogicalChannel::TargetTemperature, CapabilityKey::TARGET_SETPOINT),
            (LogicalChannel::CoolThreshold, COOL_WRITE.own_key),
            (LogicalChannel::HeatThreshold, HEAT_WRITE.own_key),
        ] {
            assert_eq!(channel.key(), Some(key), "{}", channel);
        }
    }

    #[test]
    fn test_threshold_writes_are_mirrored() {
        assert_eq!(COOL_WRITE.own_key, HEAT_WRITE.paired_key);
        assert_eq!(COOL_WRITE.paired_key, HEAT_WRITE.own_key);
        assert_eq!(COOL_WRITE.own_field, HEAT_WRITE.paired_field);
    }
}
