//! Structured events emitted by capture sessions.
//!
//! Sessions never look at the outcome of an event, a sink that fails to write
//! must swallow the failure.

use tracing::{info, warn};

pub trait CaptureEvents: Send + Sync {
    /// A live handle was opened and its rx thread launched
    fn interface_started(&self, interface: &str);

    /// Progress report, emitted every [`PROGRESS_INTERVAL`] frames
    fn packet_captured(&self, interface: &str, count: u64);

    /// The output queue was full and the newest frame got discarded
    fn frame_dropped(&self, interface: &str, total_dropped: u64);

    fn capture_stopped(&self, interface: &str);
}

/// Number of frames between two `packet_captured` events
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Forward capture events to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEvents;

impl CaptureEvents for TracingEvents {
    fn interface_started(&self, interface: &str) {
        info!(
            component = "capture",
            interface,
            event_type = "interface_started",
            "Network interface monitoring started"
        );
    }

    fn packet_captured(&self, interface: &str, count: u64) {
        info!(
            component = "capture",
            interface,
            packet_count = count,
            event_type = "packet_captured",
            "Packet captured successfully"
        );
    }

    fn frame_dropped(&self, interface: &str, total_dropped: u64) {
        warn!(
            component = "capture",
            interface,
            total_dropped,
            event_type = "frame_dropped",
            "Packet channel full, dropping packet"
        );
    }

    fn capture_stopped(&self, interface: &str) {
        info!(
            component = "capture",
            interface,
            event_type = "capture_stopped",
            "Packet capture stopped"
        );
    }
}
