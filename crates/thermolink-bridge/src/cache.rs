//! In-process implementations of the cache seams.
//!
//! - [`StateCache`]: TTL cache in front of an upstream [`StateSource`], with a
//!   per-device [`PointCache`] view over the same entries.
//! - [`MemoryPointCache`]: a standalone point cache over one snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use thermolink_core::{CapabilityKey, CapabilityState, Snapshot};
use tracing::debug;

use crate::ports::{PointCache, RemoteResult, StateSource};

/// Point cache over a single in-memory snapshot.
#[derive(Debug, Default)]
pub struct MemoryPointCache {
    entries: RwLock<Snapshot>,
}

impl MemoryPointCache {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            entries: RwLock::new(snapshot),
        }
    }

    /// Copy of the current entries.
    pub fn snapshot(&self) -> Snapshot {
        self.entries.read().clone()
    }

    /// Replace all entries, as an external refresh would.
    pub fn replace(&self, snapshot: Snapshot) {
        *self.entries.write() = snapshot;
    }
}

impl PointCache for MemoryPointCache {
    fn get(&self, key: CapabilityKey) -> Option<CapabilityState> {
        self.entries.read().find(key).cloned()
    }

    fn set(&self, state: CapabilityState) {
        self.entries.write().upsert(state);
    }
}

#[derive(Debug)]
struct CachedDevice {
    snapshot: Snapshot,
    /// `None` when the entry only holds local writes or was invalidated.
    fetched_at: Option<Instant>,
}

impl CachedDevice {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.is_some_and(|t| t.elapsed() < ttl)
    }
}

/// TTL snapshot cache shared by every bridge talking to the same upstream.
///
/// A refresh replaces the device's whole entry once the upstream fetch
/// returns. A point write made while that fetch is in flight is overwritten
/// by the older upstream snapshot; callers needing read-after-write across a
/// refresh must serialize writes and refreshes per device.
pub struct StateCache {
    upstream: Arc<dyn StateSource>,
    ttl: Duration,
    devices: RwLock<HashMap<String, CachedDevice>>,
}

impl StateCache {
    pub fn new(upstream: Arc<dyn StateSource>, ttl: Duration) -> Self {
        Self {
            upstream,
            ttl,
            devices: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Point-cache view for one device.
    pub fn point_cache(self: &Arc<Self>, device_id: impl Into<String>) -> DevicePointCache {
        DevicePointCache {
            cache: Arc::clone(self),
            device_id: device_id.into(),
        }
    }

    /// Current cached entries for a device, fresh or not.
    pub fn peek(&self, device_id: &str) -> Option<Snapshot> {
        self.devices.read().get(device_id).map(|d| d.snapshot.clone())
    }

    /// Force the next fetch for `device_id` to go upstream. Cached entries
    /// stay readable until that fetch replaces them.
    pub fn invalidate(&self, device_id: &str) {
        if let Some(device) = self.devices.write().get_mut(device_id) {
            device.fetched_at = None;
        }
    }

    fn fresh_snapshot(&self, device_id: &str) -> Option<Snapshot> {
        self.devices
            .read()
            .get(device_id)
            .filter(|d| d.is_fresh(self.ttl))
            .map(|d| d.snapshot.clone())
    }

    fn get_entry(&self, device_id: &str, key: CapabilityKey) -> Option<CapabilityState> {
        self.devices
            .read()
            .get(device_id)
            .and_then(|d| d.snapshot.find(key).cloned())
    }

    fn set_entry(&self, device_id: &str, state: CapabilityState) {
        self.devices
            .write()
            .entry(device_id.to_string())
            .or_insert_with(|| CachedDevice {
                snapshot: Snapshot::default(),
                fetched_at: None,
            })
            .snapshot
            .upsert(state);
    }
}

#[async_trait]
impl StateSource for StateCache {
    async fn fetch_snapshot(&self, device_id: &str) -> RemoteResult<Snapshot> {
        if let Some(snapshot) = self.fresh_snapshot(device_id) {
            debug!(device_id, "Serving cached snapshot");
            return Ok(snapshot);
        }

        let snapshot = self.upstream.fetch_snapshot(device_id).await?;
        debug!(device_id, entries = snapshot.len(), "Refreshed snapshot");
        self.devices.write().insert(
            device_id.to_string(),
            CachedDevice {
                snapshot: snapshot.clone(),
                fetched_at: Some(Instant::now()),
            },
        );
        Ok(snapshot)
    }
}

/// [`PointCache`] view of one device inside a [`StateCache`].
#[derive(Clone)]
pub struct DevicePointCache {
    cache: Arc<StateCache>,
    device_id: String,
}

impl DevicePointCache {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl PointCache for DevicePointCache {
    fn get(&self, key: CapabilityKey) -> Option<CapabilityState> {
        self.cache.get_entry(&self.device_id, key)
    }

    fn set(&self, state: CapabilityState) {
        self.cache.set_entry(&self.device_id, state);
    }
}
