use std::convert::TryFrom;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use pcap::{Active, Capture};
use tracing::{debug, error, info};

use tripwire_api as api;
use tripwire_utils as utils;
use api::config::SessionConfig;
use api::error::BoxError;
use api::events::{CaptureEvents, PROGRESS_INTERVAL};
use api::packet::{CapturedFrame, RawFrame};
use api::stats::{RxStat, SharedStats};
use api::utils::timeval;
use utils::classifier;
use utils::dissectors::LinkType;

use crate::{CaptureUnit, Read};

/// Max bytes captured per frame
const SNAPLEN: i32 = 65535;

pub(crate) struct NetworkInterface {
    cap: Capture<Active>,
    link_type: LinkType,
}

impl NetworkInterface {
    /// Open a live handle on the configured interface
    pub fn open(cfg: &SessionConfig, timeout: Duration) -> Result<NetworkInterface, pcap::Error> {
        // libpcap treats a zero timeout as wait forever, which would block stop
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX).max(1);

        let mut cap = pcap::Capture::from_device(cfg.name.as_str())?
            .promisc(cfg.promiscuous)
            .snaplen(SNAPLEN)
            .timeout(timeout_ms);
        if cfg.buffer_size > 0 {
            cap = cap.buffer_size(cfg.buffer_size);
        }
        let cap = cap.open()?;

        let link_type = LinkType::from_dlt(cap.get_datalink().0);
        if let LinkType::Other(dlt) = link_type {
            info!(
                interface = cfg.name.as_str(),
                dlt, "Unsupported link type, frames will be labeled Unknown"
            );
        }

        Ok(NetworkInterface { cap, link_type })
    }
}

impl CaptureUnit for NetworkInterface {
    #[inline]
    fn link_type(&self) -> LinkType {
        self.link_type
    }

    #[inline]
    fn next(&mut self) -> Result<Read<'_>, BoxError> {
        match self.cap.next_packet() {
            Ok(pkt) => Ok(Read::Frame(RawFrame {
                ts: timeval::to_datetime(&pkt.header.ts),
                len: pkt.header.len,
                data: pkt.data,
            })),
            Err(pcap::Error::TimeoutExpired) => Ok(Read::Timeout),
            Err(pcap::Error::NoMorePackets) => Ok(Read::Eof),
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    fn stats(&mut self) -> Result<RxStat, BoxError> {
        let cap_stats = self.cap.stats()?;
        Ok(RxStat {
            rx_pkts: cap_stats.received as u64,
            dropped: cap_stats.dropped as u64,
            if_dropped: cap_stats.if_dropped as u64,
        })
    }
}

/// Non blocking producer side of a session's output queue
pub(crate) struct Publisher {
    pub sender: Sender<CapturedFrame>,
    pub overload: Arc<AtomicU64>,
    pub events: Arc<dyn CaptureEvents>,
    pub interface: String,
}

impl Publisher {
    /// Hand a frame to the consumers, dropping it when the queue is full.
    /// Returns false once every receiver is gone.
    pub fn publish(&self, frame: CapturedFrame) -> bool {
        match self.sender.try_send(frame) {
            Ok(_) => true,
            Err(TrySendError::Full(_)) => {
                let total = self.overload.fetch_add(1, Ordering::Relaxed) + 1;
                self.events.frame_dropped(&self.interface, total);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                info!(
                    interface = self.interface.as_str(),
                    "Output queue is closed, exit"
                );
                false
            }
        }
    }
}

/// Acquisition loop of one capture session
pub(crate) struct RxThread {
    pub exit: Arc<AtomicBool>,
    pub interface: String,
    pub retain_raw: bool,
    pub cap: Box<dyn CaptureUnit>,
    pub stats: SharedStats,
    pub publisher: Publisher,
    pub events: Arc<dyn CaptureEvents>,
}

impl RxThread {
    /// Run until the exit flag is raised or the handle is exhausted. The capture
    /// handle and the queue producer are released when this returns.
    pub fn spawn(mut self) {
        let link_type = self.cap.link_type();
        let mut rx_cnt: u64 = 0;

        debug!("{} started", self.name());

        while !self.exit.load(Ordering::Relaxed) {
            let frame = match self.cap.next() {
                Ok(Read::Frame(raw)) => {
                    classifier::classify(link_type, &raw, &self.interface, self.retain_raw)
                }
                Ok(Read::Timeout) => continue,
                Ok(Read::Eof) => {
                    info!(interface = self.interface.as_str(), "No more packets to read");
                    break;
                }
                Err(e) => {
                    error!(
                        interface = self.interface.as_str(),
                        error = %e,
                        "Failed to read packet, stop capturing"
                    );
                    break;
                }
            };

            rx_cnt += 1;
            self.stats.record(&frame);

            if rx_cnt % PROGRESS_INTERVAL == 0 {
                self.events.packet_captured(&self.interface, rx_cnt);
                match self.cap.stats() {
                    Ok(stats) => debug!(
                        interface = self.interface.as_str(),
                        rx_cnt,
                        rx_pkts = stats.rx_pkts,
                        dropped = stats.dropped,
                        if_dropped = stats.if_dropped,
                        "{} kernel stats",
                        self.name()
                    ),
                    Err(e) => debug!(error = %e, "{} failed to read kernel stats", self.name()),
                };
            }

            // a stop request wins over any further publish
            if self.exit.load(Ordering::Relaxed) {
                break;
            }

            if !self.publisher.publish(frame) {
                break;
            }
        }

        debug!("{} exit", self.name());
    }

    pub fn name(&self) -> String {
        format!("tripwire-{}", self.interface)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct Drops(Mutex<Vec<u64>>);

    impl CaptureEvents for Drops {
        fn interface_started(&self, _: &str) {}
        fn packet_captured(&self, _: &str, _: u64) {}
        fn frame_dropped(&self, _: &str, total_dropped: u64) {
            self.0.lock().unwrap().push(total_dropped);
        }
        fn capture_stopped(&self, _: &str) {}
    }

    #[test]
    fn drop_newest_when_full() {
        let (sender, receiver) = crossbeam_channel::bounded(3);
        let events = Arc::new(Drops::default());
        let publisher = Publisher {
            sender,
            overload: Arc::new(AtomicU64::new(0)),
            events: events.clone(),
            interface: String::from("eth0"),
        };

        for len in 1..=4 {
            assert!(publisher.publish(CapturedFrame::new(Utc::now(), "eth0", len)));
        }

        assert_eq!(publisher.overload.load(Ordering::Relaxed), 1);
        assert_eq!(*events.0.lock().unwrap(), vec![1]);
        let lengths: Vec<u32> = receiver.try_iter().map(|f| f.length).collect();
        assert_eq!(lengths, vec![1, 2, 3]);
    }

    #[test]
    fn closed_queue() {
        let (sender, receiver) = crossbeam_channel::bounded(3);
        drop(receiver);
        let publisher = Publisher {
            sender,
            overload: Arc::new(AtomicU64::new(0)),
            events: Arc::new(Drops::default()),
            interface: String::from("eth0"),
        };
        assert!(!publisher.publish(CapturedFrame::new(Utc::now(), "eth0", 1)));
        assert_eq!(publisher.overload.load(Ordering::Relaxed), 0);
    }
}
