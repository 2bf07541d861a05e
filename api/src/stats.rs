use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::packet::CapturedFrame;

/// Counters libpcap keeps for a live handle
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RxStat {
    /// Total received packets
    pub rx_pkts: u64,
    /// Total dropped packets
    pub dropped: u64,
    /// Total dropped packets by network interface
    pub if_dropped: u64,
}

/// Per session traffic statistics
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsAggregate {
    pub total_frames: u64,
    /// Frame count per protocol label
    pub protocol_counts: HashMap<String, u64>,
    pub bytes_total: u64,
    pub start_time: DateTime<Utc>,
    pub last_frame_time: Option<DateTime<Utc>>,
}

impl Default for StatsAggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregate {
    pub fn new() -> Self {
        StatsAggregate {
            total_frames: 0,
            protocol_counts: HashMap::new(),
            bytes_total: 0,
            start_time: Utc::now(),
            last_frame_time: None,
        }
    }

    /// Account one classified frame
    pub fn update(&mut self, frame: &CapturedFrame) {
        self.total_frames += 1;
        *self
            .protocol_counts
            .entry(frame.protocol.clone())
            .or_insert(0) += 1;
        self.bytes_total += frame.length as u64;
        self.last_frame_time = Some(frame.timestamp);
    }

    #[inline]
    pub fn protocol_count(&self, protocol: &str) -> u64 {
        self.protocol_counts.get(protocol).copied().unwrap_or(0)
    }

    /// Protocol counters ordered by label, for display
    pub fn sorted_protocol_counts(&self) -> BTreeMap<&str, u64> {
        self.protocol_counts
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect()
    }
}

/// Statistics shared between a session's rx thread (the only writer) and its pollers
#[derive(Clone, Debug, Default)]
pub struct SharedStats(Arc<Mutex<StatsAggregate>>);

impl SharedStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatsAggregate> {
        // A panicking writer leaves plain counters behind, they are still readable
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    pub fn record(&self, frame: &CapturedFrame) {
        self.lock().update(frame);
    }

    /// Consistent copy of the counters at this instant
    pub fn snapshot(&self) -> StatsAggregate {
        self.lock().clone()
    }
}
