//! Bridge write-path tests
//!
//! Tests for:
//! 1. Target writes and the AUTO/unknown mode guard
//! 2. Threshold writes sending both setpoints in the paired scale
//! 3. Cache updates only after a successful command
//! 4. Read-only channels and invalid input
//!
//! Run with: cargo test -p thermolink-bridge --test bridge_write_test

use std::time::Duration;

use thermolink_bridge::{HostFault, PointCache};
use thermolink_core::config::namespaces;
use thermolink_core::{
    CapabilityKey, CharacteristicValue, LogicalChannel, RemoteValue, Temperature,
    TemperatureScale,
};
use thermolink_testing::{BridgeHarness, SnapshotBuilder};

const C: TemperatureScale = TemperatureScale::Celsius;
const F: TemperatureScale = TemperatureScale::Fahrenheit;

fn cached_temperature(harness: &BridgeHarness, key: CapabilityKey) -> Option<Temperature> {
    harness
        .cache
        .get(key)
        .and_then(|s| s.value.as_temperature().cloned())
}

// ========== Target ==========

#[tokio::test]
async fn test_target_write_in_heat_sends_command_and_caches() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());

    let result = harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(23.0))
        .await;
    assert_eq!(result, Ok(()));

    let command = harness.remote.last_command().unwrap();
    assert_eq!(command.device_id, "thermostat-1");
    assert_eq!(command.action, "setTargetTemperature");
    assert_eq!(command.params.len(), 2);
    assert_eq!(command.param("targetTemperature.scale"), Some("celsius"));
    assert_eq!(command.param("targetTemperature.value"), Some("23"));

    assert_eq!(
        cached_temperature(&harness, CapabilityKey::TARGET_SETPOINT),
        Some(Temperature::celsius(23.0))
    );
}

#[tokio::test]
async fn test_target_write_converts_to_sensor_scale() {
    let snapshot = SnapshotBuilder::new().current(72.0, F).mode("COOL").build();
    let harness = BridgeHarness::new(snapshot);

    harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(22.0))
        .await
        .unwrap();

    let command = harness.remote.last_command().unwrap();
    assert_eq!(command.param("targetTemperature.scale"), Some("fahrenheit"));
    assert_eq!(command.param("targetTemperature.value"), Some("71.6"));
    assert_eq!(
        cached_temperature(&harness, CapabilityKey::TARGET_SETPOINT),
        Some(Temperature::fahrenheit(71.6))
    );
}

#[tokio::test]
async fn test_target_write_is_clamped() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());

    harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(5.0))
        .await
        .unwrap();

    let command = harness.remote.last_command().unwrap();
    assert_eq!(command.param("targetTemperature.value"), Some("10"));
}

#[tokio::test]
async fn test_target_write_in_auto_is_rejected_without_side_effects() {
    let snapshot = SnapshotBuilder::new()
        .current(21.0, C)
        .mode("AUTO")
        .lower(20.0, C)
        .upper(24.0, C)
        .build();
    let harness = BridgeHarness::new(snapshot);
    let before = harness.cached();

    let result = harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(22.0))
        .await;

    assert_eq!(result, Err(HostFault::NotAllowed));
    assert_eq!(harness.remote.command_count(), 0);
    assert_eq!(harness.remote.fetch_count(), 0);
    assert_eq!(harness.cached(), before);
}

#[tokio::test]
async fn test_target_write_without_mode_is_rejected() {
    let harness = BridgeHarness::new(SnapshotBuilder::new().current(21.0, C).build());

    let result = harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(22.0))
        .await;

    assert_eq!(result, Err(HostFault::NotAllowed));
    assert_eq!(harness.remote.command_count(), 0);
}

#[tokio::test]
async fn test_target_write_without_sensor_is_rejected() {
    let harness = BridgeHarness::new(SnapshotBuilder::new().mode("HEAT").build());

    let result = harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(22.0))
        .await;

    assert_eq!(result, Err(HostFault::NotAllowed));
    assert_eq!(harness.remote.command_count(), 0);
}

#[tokio::test]
async fn test_target_write_with_unknown_sensor_scale_is_rejected() {
    let snapshot = SnapshotBuilder::new()
        .current(500.0, TemperatureScale::parse("RANKINE"))
        .mode("HEAT")
        .build();
    let harness = BridgeHarness::new(snapshot);
    let before = harness.cached();

    let result = harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(22.0))
        .await;

    assert_eq!(result, Err(HostFault::NotAllowed));
    assert_eq!(harness.remote.command_count(), 0);
    assert_eq!(harness.cached(), before);
}

#[tokio::test]
async fn test_target_write_non_numeric_is_invalid() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());

    for value in [
        CharacteristicValue::from("warm"),
        CharacteristicValue::from(true),
        CharacteristicValue::from(f64::NAN),
    ] {
        let result = harness.bridge.handle_target_temp_set(value).await;
        assert_eq!(result, Err(HostFault::InvalidValue));
    }
    assert_eq!(harness.remote.command_count(), 0);
}

#[tokio::test]
async fn test_target_write_failure_leaves_cache_unchanged() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());
    harness.remote.fail_commands(true);
    let before = harness.cached();

    let result = harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(25.0))
        .await;

    assert_eq!(result, Err(HostFault::CommunicationFailure));
    assert_eq!(harness.remote.command_count(), 1);
    assert_eq!(harness.cached(), before);
}

// ========== Thresholds ==========

#[tokio::test]
async fn test_cool_write_clamps_and_sends_both_setpoints() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());

    let result = harness
        .bridge
        .handle_cool_temp_set(CharacteristicValue::from(40.0))
        .await;
    assert_eq!(result, Ok(()));

    let command = harness.remote.last_command().unwrap();
    assert_eq!(command.action, "setTargetTemperature");
    assert_eq!(command.params.len(), 4);
    assert_eq!(command.param("upperSetTemperature.scale"), Some("celsius"));
    assert_eq!(command.param("upperSetTemperature.value"), Some("35"));
    assert_eq!(command.param("lowerSetTemperature.scale"), Some("celsius"));
    assert_eq!(command.param("lowerSetTemperature.value"), Some("20"));

    assert_eq!(
        cached_temperature(&harness, CapabilityKey::UPPER_SETPOINT),
        Some(Temperature::celsius(35.0))
    );
    assert_eq!(
        cached_temperature(&harness, CapabilityKey::LOWER_SETPOINT),
        Some(Temperature::celsius(20.0))
    );
}

#[tokio::test]
async fn test_heat_write_uses_paired_scale() {
    let snapshot = SnapshotBuilder::new()
        .current(70.0, F)
        .mode("AUTO")
        .lower(65.0, F)
        .upper(77.0, F)
        .build();
    let harness = BridgeHarness::new(snapshot);

    harness
        .bridge
        .handle_heat_temp_set(CharacteristicValue::from(20.0))
        .await
        .unwrap();

    let command = harness.remote.last_command().unwrap();
    assert_eq!(command.param("lowerSetTemperature.scale"), Some("fahrenheit"));
    assert_eq!(command.param("lowerSetTemperature.value"), Some("68"));
    assert_eq!(command.param("upperSetTemperature.scale"), Some("fahrenheit"));
    assert_eq!(command.param("upperSetTemperature.value"), Some("77"));
    assert_eq!(
        cached_temperature(&harness, CapabilityKey::LOWER_SETPOINT),
        Some(Temperature::fahrenheit(68.0))
    );
}

async fn assert_threshold_write_rejected(snapshot: SnapshotBuilder, channel: LogicalChannel) {
    let harness = BridgeHarness::new(snapshot.build());
    let before = harness.cached();

    let result = harness
        .bridge
        .set(channel, CharacteristicValue::from(23.0))
        .await;

    assert_eq!(result, Err(HostFault::NotAllowed), "{}", channel);
    assert_eq!(harness.remote.command_count(), 0);
    assert_eq!(harness.cached(), before);
}

#[tokio::test]
async fn test_threshold_write_without_pair_is_rejected() {
    let base = SnapshotBuilder::new().current(21.0, C).mode("AUTO");

    assert_threshold_write_rejected(base.clone().upper(24.0, C), LogicalChannel::CoolThreshold)
        .await;
    assert_threshold_write_rejected(base.lower(20.0, C), LogicalChannel::HeatThreshold).await;
}

#[tokio::test]
async fn test_threshold_write_with_unknown_pair_scale_is_rejected() {
    let rankine = TemperatureScale::parse("RANKINE");
    let base = SnapshotBuilder::new().current(21.0, C).mode("AUTO");

    assert_threshold_write_rejected(
        base.clone().lower(528.0, rankine.clone()).upper(24.0, C),
        LogicalChannel::CoolThreshold,
    )
    .await;
    assert_threshold_write_rejected(
        base.lower(20.0, C).upper(535.0, rankine),
        LogicalChannel::HeatThreshold,
    )
    .await;
}

#[tokio::test]
async fn test_threshold_write_with_non_temperature_pair_is_rejected() {
    let base = SnapshotBuilder::new().current(21.0, C).mode("AUTO");

    assert_threshold_write_rejected(
        base.clone()
            .with(
                namespaces::THERMOSTAT_CONTROLLER,
                namespaces::names::LOWER_SETPOINT,
                RemoteValue::Text("twenty".to_string()),
            )
            .upper(24.0, C),
        LogicalChannel::CoolThreshold,
    )
    .await;
    assert_threshold_write_rejected(
        base.lower(20.0, C).with(
            namespaces::THERMOSTAT_CONTROLLER,
            namespaces::names::UPPER_SETPOINT,
            RemoteValue::Text("twenty-four".to_string()),
        ),
        LogicalChannel::HeatThreshold,
    )
    .await;
}

#[tokio::test]
async fn test_threshold_write_non_numeric_is_invalid() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());

    let result = harness
        .bridge
        .handle_heat_temp_set(CharacteristicValue::from("cold"))
        .await;

    assert_eq!(result, Err(HostFault::InvalidValue));
    assert_eq!(harness.remote.command_count(), 0);
}

#[tokio::test]
async fn test_failed_heat_write_leaves_cache_unchanged() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());
    harness.remote.fail_commands(true);
    let before = harness.cached();

    let result = harness
        .bridge
        .handle_heat_temp_set(CharacteristicValue::from(18.0))
        .await;

    assert_eq!(result, Err(HostFault::CommunicationFailure));
    assert_eq!(harness.remote.command_count(), 1);
    assert_eq!(harness.cached(), before);
}

// ========== Read-only channels ==========

#[tokio::test]
async fn test_read_only_channels_reject_writes() {
    let harness = BridgeHarness::new(SnapshotBuilder::heating_celsius().build());
    let bridge = &harness.bridge;

    assert_eq!(
        bridge.handle_target_state_set(CharacteristicValue::from(1.0)),
        Err(HostFault::ReadOnlyViolation)
    );
    assert_eq!(
        bridge.handle_temp_units_set(CharacteristicValue::from(1.0)),
        Err(HostFault::ReadOnlyViolation)
    );
    for channel in [
        LogicalChannel::Mode,
        LogicalChannel::Units,
        LogicalChannel::CurrentTemperature,
        LogicalChannel::CurrentHeatingCoolingState,
    ] {
        assert_eq!(
            bridge.set(channel, CharacteristicValue::from(20.0)).await,
            Err(HostFault::ReadOnlyViolation),
            "{}",
            channel
        );
    }
    assert_eq!(harness.remote.command_count(), 0);
}

#[test]
fn test_fault_status_codes() {
    assert_eq!(HostFault::CommunicationFailure.status_code(), -70402);
    assert_eq!(HostFault::ReadOnlyViolation.status_code(), -70404);
    assert_eq!(HostFault::InvalidValue.status_code(), -70410);
    assert_eq!(HostFault::NotAllowed.status_code(), -70412);
}

// ========== Through the state cache ==========

#[tokio::test]
async fn test_write_is_visible_through_state_cache() {
    let (harness, state_cache) = BridgeHarness::with_state_cache(
        SnapshotBuilder::heating_celsius().build(),
        Duration::from_secs(60),
    );

    // Nothing cached yet, so the guard has no mode and rejects.
    assert_eq!(
        harness
            .bridge
            .handle_target_temp_set(CharacteristicValue::from(23.0))
            .await,
        Err(HostFault::NotAllowed)
    );

    assert_eq!(harness.bridge.handle_target_temp_get().await, Ok(22.0));
    assert_eq!(harness.remote.fetch_count(), 1);

    harness
        .bridge
        .handle_target_temp_set(CharacteristicValue::from(23.0))
        .await
        .unwrap();
    assert_eq!(harness.bridge.handle_target_temp_get().await, Ok(23.0));
    assert_eq!(harness.remote.fetch_count(), 1);

    state_cache.invalidate("thermostat-1");
    assert_eq!(harness.bridge.handle_target_temp_get().await, Ok(22.0));
    assert_eq!(harness.remote.fetch_count(), 2);
}
