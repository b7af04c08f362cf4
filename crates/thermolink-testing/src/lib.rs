//! Testing utilities for Thermolink
//!
//! This crate provides testing tools including:
//! - Simulated remote thermostat (state source and command sink)
//! - Snapshot builders for common thermostat states
//! - A bridge harness wiring both to a point cache

pub mod device_simulator;
pub mod scenarios;

pub use device_simulator::{RecordedCommand, SimulatedThermostat};
pub use scenarios::{BridgeHarness, SnapshotBuilder};
