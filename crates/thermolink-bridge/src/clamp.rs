//! Range clamp.

use thermolink_core::{ChannelRange, LogicalChannel};

/// `value ↦ max(min, min(max, value))`
pub fn clamp(min: f64, max: f64) -> impl Fn(f64) -> f64 {
    move |value| min.max(max.min(value))
}

/// Clamp into a declared range.
pub fn clamp_to(range: ChannelRange, value: f64) -> f64 {
    clamp(range.min, range.max)(value)
}

/// Clamp into a channel's fixed range. Channels without one pass through.
pub fn clamp_channel(channel: LogicalChannel, value: f64) -> f64 {
    clamp_to(channel.range().unwrap_or(ChannelRange::UNBOUNDED), value)
}
