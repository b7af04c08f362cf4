//! State translation and caching bridge for a cloud-backed thermostat.
//!
//! ## Architecture
//!
//! ```text
//!  host get/set ──▶ ThermostatBridge ──▶ guard (mode predicates)
//!                        │   │
//!                        │   ├──▶ mapper / clamp / resolver (pure)
//!                        │   │
//!                        ▼   ▼
//!              StateSource  CommandSink  PointCache
//!              (snapshot)   (commands)   (single entries)
//! ```
//!
//! - **Ports** ([`ports`]): the three collaborator seams, injected as `Arc<dyn _>`.
//! - **Mappers** ([`mapper`]): remote value ⇄ local value conversions.
//! - **Clamp** ([`clamp`]): per-channel range enforcement.
//! - **Resolver** ([`resolver`]): the auto-mode midpoint target.
//! - **Guard** ([`guard`]): the two asymmetric mode predicates.
//! - **Bridge** ([`bridge`]): per-channel read and write orchestration.
//! - **Cache** ([`cache`]): in-process reference implementations of the cache seams.
//!
//! Every bridge entry point returns a detail-free [`HostFault`]; the detailed
//! [`BridgeError`] is logged once at that boundary.

pub mod bridge;
pub mod cache;
pub mod clamp;
pub mod error;
pub mod guard;
pub mod mapper;
pub mod ports;
pub mod resolver;

pub use bridge::{is_thermostat_capable, ChannelValue, ThermostatBridge, REQUIRED_OPERATIONS};
pub use cache::{DevicePointCache, MemoryPointCache, StateCache};
pub use error::{BridgeError, BridgeResult, HostFault};
pub use ports::{CommandParams, CommandSink, PointCache, RemoteError, RemoteResult, StateSource};
