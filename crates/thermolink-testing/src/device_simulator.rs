//! Simulated Remote Thermostat
//!
//! Stands in for the cloud API on both sides: serves a configurable snapshot
//! and records every command it receives. Fetches and commands can be made to
//! fail to exercise the bridge's error paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use thermolink_bridge::{CommandParams, CommandSink, RemoteError, RemoteResult, StateSource};
use thermolink_core::Snapshot;

/// A command received by the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    pub device_id: String,
    pub action: String,
    pub params: CommandParams,
}

impl RecordedCommand {
    /// Parameter value, if present.
    pub fn param(&self, field: &str) -> Option<&str> {
        self.params.get(field).map(String::as_str)
    }
}

/// Simulated cloud thermostat.
#[derive(Debug, Default)]
pub struct SimulatedThermostat {
    snapshot: RwLock<Snapshot>,
    commands: Mutex<Vec<RecordedCommand>>,
    fetches: AtomicUsize,
    fail_fetches: AtomicBool,
    fail_commands: AtomicBool,
}

impl SimulatedThermostat {
    /// Create a simulator reporting `snapshot`.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            ..Default::default()
        }
    }

    /// Replace the reported snapshot.
    pub fn set_snapshot(&self, snapshot: Snapshot) {
        *self.snapshot.write() = snapshot;
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent commands fail (or succeed again).
    pub fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    /// All commands received so far, including failed ones.
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.lock().clone()
    }

    /// The most recent command.
    pub fn last_command(&self) -> Option<RecordedCommand> {
        self.commands.lock().last().cloned()
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateSource for SimulatedThermostat {
    async fn fetch_snapshot(&self, device_id: &str) -> RemoteResult<Snapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            tracing::debug!(device_id, "Simulated fetch failure");
            return Err(RemoteError::Transport("simulated fetch failure".to_string()));
        }
        Ok(self.snapshot.read().clone())
    }
}

#[async_trait]
impl CommandSink for SimulatedThermostat {
    async fn set_device_state(
        &self,
        device_id: &str,
        action: &str,
        params: &CommandParams,
    ) -> RemoteResult<()> {
        self.commands.lock().push(RecordedCommand {
            device_id: device_id.to_string(),
            action: action.to_string(),
            params: params.clone(),
        });
        if self.fail_commands.load(Ordering::SeqCst) {
            tracing::debug!(device_id, action, "Simulated command failure");
            return Err(RemoteError::Transport("simulated transport error".to_string()));
        }
        Ok(())
    }
}
