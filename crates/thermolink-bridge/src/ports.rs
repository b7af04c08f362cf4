//! Collaborator interfaces the bridge depends on.
//!
//! The remote API is split into a read side ([`StateSource`]) and a write side
//! ([`CommandSink`]); both are async and fallible. The point cache is
//! synchronous and infallible: it is an in-process map the bridge reads for
//! companion data and updates right after a successful write.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thermolink_core::{CapabilityKey, CapabilityState, Snapshot};
use thiserror::Error;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Command parameters: dotted field path → string-encoded value.
pub type CommandParams = BTreeMap<String, String>;

/// Error type for remote calls.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote API answered with an error status
    #[error("Remote API returned {code}: {message}")]
    Status { code: u16, message: String },

    /// Operation timeout
    #[error("Operation timeout after {0}ms")]
    Timeout(u64),

    /// Other error
    #[error("Remote error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Source of grouped device state.
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Fetch the full capability-state snapshot for a device. Implementations
    /// may serve a recent cached copy.
    async fn fetch_snapshot(&self, device_id: &str) -> RemoteResult<Snapshot>;
}

/// Sink for device commands.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Issue a single remote action with its parameters.
    async fn set_device_state(
        &self,
        device_id: &str,
        action: &str,
        params: &CommandParams,
    ) -> RemoteResult<()>;
}

/// Point lookup/update of single capability entries for one device.
pub trait PointCache: Send + Sync {
    fn get(&self, key: CapabilityKey) -> Option<CapabilityState>;

    /// Replace the entry in the same `(namespace, name)` slot, or add it.
    fn set(&self, state: CapabilityState);
}

#[async_trait]
impl<T: StateSource + ?Sized> StateSource for Arc<T> {
    async fn fetch_snapshot(&self, device_id: &str) -> RemoteResult<Snapshot> {
        (**self).fetch_snapshot(device_id).await
    }
}

#[async_trait]
impl<T: CommandSink + ?Sized> CommandSink for Arc<T> {
    async fn set_device_state(
        &self,
        device_id: &str,
        action: &str,
        params: &CommandParams,
    ) -> RemoteResult<()> {
        (**self).set_device_state(device_id, action, params).await
    }
}

impl<T: PointCache + ?Sized> PointCache for Arc<T> {
    fn get(&self, key: CapabilityKey) -> Option<CapabilityState> {
        (**self).get(key)
    }

    fn set(&self, state: CapabilityState) {
        (**self).set(state)
    }
}
