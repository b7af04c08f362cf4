//! Bridge error taxonomy.
//!
//! [`BridgeError`] carries full diagnostic context and never leaves the crate's
//! entry points. It is logged once and reduced to a [`HostFault`], the only
//! error the hosting framework sees.

use thermolink_core::{CapabilityKey, CharacteristicValue, LogicalChannel};
use thiserror::Error;

use crate::ports::RemoteError;

/// Result type for internal bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Detailed bridge failure.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Snapshot fetch failed
    #[error("Failed to fetch state for device {device_id}: {source}")]
    Fetch {
        device_id: String,
        #[source]
        source: RemoteError,
    },

    /// Remote command failed
    #[error("Command {action} failed for device {device_id}: {source}")]
    Command {
        device_id: String,
        action: String,
        #[source]
        source: RemoteError,
    },

    /// Snapshot has no entry for the channel
    #[error("No {key} entry in snapshot")]
    MissingState { key: CapabilityKey },

    /// Entry exists but its value cannot be mapped
    #[error("Entry {key} has an unusable value")]
    UnusableState { key: CapabilityKey },

    /// Write rejected by the mode guard or for lack of companion data
    #[error("Write to {channel} not allowed: {reason}")]
    NotAllowed {
        channel: LogicalChannel,
        reason: &'static str,
    },

    /// Write input is not a usable number
    #[error("Invalid value for {channel}: {value}")]
    InvalidValue {
        channel: LogicalChannel,
        value: CharacteristicValue,
    },

    /// Write to a read-only channel
    #[error("{channel} is read-only")]
    ReadOnly { channel: LogicalChannel },
}

impl BridgeError {
    /// The host-facing fault this error is surfaced as.
    pub fn fault(&self) -> HostFault {
        match self {
            Self::Fetch { .. }
            | Self::Command { .. }
            | Self::MissingState { .. }
            | Self::UnusableState { .. } => HostFault::CommunicationFailure,
            Self::NotAllowed { .. } => HostFault::NotAllowed,
            Self::InvalidValue { .. } => HostFault::InvalidValue,
            Self::ReadOnly { .. } => HostFault::ReadOnlyViolation,
        }
    }
}

/// Fault raised to the hosting framework. Carries no internal detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostFault {
    #[error("Service communication failure")]
    CommunicationFailure,

    #[error("Operation not allowed in current state")]
    NotAllowed,

    #[error("Invalid value in request")]
    InvalidValue,

    #[error("Characteristic is read-only")]
    ReadOnlyViolation,
}

impl HostFault {
    /// Numeric status code understood by the accessory framework.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::CommunicationFailure => -70402,
            Self::ReadOnlyViolation => -70404,
            Self::InvalidValue => -70410,
            Self::NotAllowed => -70412,
        }
    }
}

impl From<BridgeError> for HostFault {
    fn from(err: BridgeError) -> Self {
        err.fault()
    }
}
