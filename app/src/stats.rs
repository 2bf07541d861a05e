use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use tripwire_api as api;
use tripwire_rx_libpcap as rx;
use api::stats::StatsAggregate;
use rx::SessionStats;

/// Granularity of the exit flag checks between two reports
const TICK: Duration = Duration::from_millis(100);

/// Statistics of one session at report time
#[derive(Debug, Serialize)]
pub struct StatsReport<'a> {
    pub interface: &'a str,
    pub total_frames: u64,
    pub bytes_total: u64,
    pub protocols: BTreeMap<&'a str, u64>,
    pub overload_dropped: u64,
    pub uptime_secs: i64,
    pub last_frame_time: Option<DateTime<Utc>>,
}

impl<'a> StatsReport<'a> {
    pub fn new(
        interface: &'a str,
        stats: &'a StatsAggregate,
        overload_dropped: u64,
        now: DateTime<Utc>,
    ) -> Self {
        StatsReport {
            interface,
            total_frames: stats.total_frames,
            bytes_total: stats.bytes_total,
            protocols: stats.sorted_protocol_counts(),
            overload_dropped,
            uptime_secs: (now - stats.start_time).num_seconds(),
            last_frame_time: stats.last_frame_time,
        }
    }
}

/// Periodically logs every session's statistics
pub struct StatsReporter {
    exit: Arc<AtomicBool>,
    interval: Duration,
    sessions: Vec<SessionStats>,
}

impl StatsReporter {
    pub fn new(exit: Arc<AtomicBool>, interval: Duration, sessions: Vec<SessionStats>) -> Self {
        StatsReporter {
            exit,
            interval,
            sessions,
        }
    }

    pub fn name(&self) -> String {
        String::from("tripwire-stats")
    }

    pub fn spawn(&self) {
        debug!("{} started", self.name());

        let mut last = Instant::now();
        while !self.exit.load(Ordering::Relaxed) {
            std::thread::sleep(TICK);
            if last.elapsed() >= self.interval {
                self.report();
                last = Instant::now();
            }
        }

        debug!("{} exit", self.name());
    }

    fn report(&self) {
        let now = Utc::now();
        for session in &self.sessions {
            let stats = session.snapshot();
            let report = StatsReport::new(session.interface_name(), &stats, session.overload_dropped(), now);
            let protocols = serde_json::to_string(&report.protocols).unwrap_or_default();
            info!(
                component = "stats",
                interface = report.interface,
                total_frames = report.total_frames,
                bytes_total = report.bytes_total,
                overload_dropped = report.overload_dropped,
                uptime_secs = report.uptime_secs,
                protocols = protocols.as_str(),
                "Capture statistics"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use api::packet::{label, CapturedFrame};

    fn frame(protocol: &str, length: u32) -> CapturedFrame {
        let mut frame = CapturedFrame::new(Utc::now(), "eth0", length);
        frame.protocol = String::from(protocol);
        frame
    }

    #[test]
    fn report() {
        let mut stats = StatsAggregate::new();
        stats.update(&frame(label::UDP, 100));
        stats.update(&frame(label::TCP, 60));
        stats.update(&frame("GRE", 80));
        stats.update(&frame(label::TCP, 60));

        let now = stats.start_time + ChronoDuration::seconds(42);
        let report = StatsReport::new("eth0", &stats, 7, now);
        assert_eq!(report.total_frames, 4);
        assert_eq!(report.bytes_total, 300);
        assert_eq!(report.overload_dropped, 7);
        assert_eq!(report.uptime_secs, 42);

        let protocols = serde_json::to_string(&report.protocols).unwrap();
        assert_eq!(protocols, r#"{"GRE":1,"TCP":2,"UDP":1}"#);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["interface"], "eth0");
        assert_eq!(json["protocols"]["TCP"], 2);
    }

    #[test]
    fn exits_on_flag() {
        let exit = Arc::new(AtomicBool::new(false));
        let reporter = StatsReporter::new(exit.clone(), Duration::from_millis(1), vec![]);
        let handle = std::thread::spawn(move || reporter.spawn());
        std::thread::sleep(Duration::from_millis(300));
        exit.store(true, Ordering::SeqCst);
        handle.join().unwrap();
    }
}
