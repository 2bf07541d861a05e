use crossbeam_channel::Receiver;
use tracing::{debug, info};

use tripwire_api as api;
use api::packet::CapturedFrame;

/// Destination ports worth a closer look
const INTERESTING_PORTS: [u16; 3] = [22, 80, 443];

/// Drains the output queue of one capture session
pub struct PktThread {
    id: usize,
    interface: String,
    receiver: Receiver<CapturedFrame>,
}

#[inline]
pub fn is_interesting(frame: &CapturedFrame) -> bool {
    frame.is_tcp()
        && frame
            .dest_port
            .map_or(false, |port| INTERESTING_PORTS.contains(&port))
}

impl PktThread {
    pub fn new<S: Into<String>>(id: usize, interface: S, receiver: Receiver<CapturedFrame>) -> Self {
        Self {
            id,
            interface: interface.into(),
            receiver,
        }
    }

    pub fn name(&self) -> String {
        format!("tripwire-pkt{}", self.id)
    }

    /// Consume frames until the session's acquisition loop closes the queue
    pub fn spawn(&self) -> u64 {
        let mut consumed: u64 = 0;

        debug!("{} started", self.name());

        for frame in self.receiver.iter() {
            consumed += 1;
            if is_interesting(&frame) {
                debug!(
                    interface = frame.interface.as_str(),
                    protocol = frame.protocol.as_str(),
                    src_ip = ?frame.source_ip,
                    dst_ip = ?frame.dest_ip,
                    src_port = ?frame.source_port,
                    dst_port = ?frame.dest_port,
                    flags = ?frame.flags,
                    size = frame.length,
                    "TCP packet captured"
                );
            }
        }

        info!(
            interface = self.interface.as_str(),
            consumed,
            "{} exit, output queue closed",
            self.name()
        );
        consumed
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use api::packet::label;

    fn frame(protocol: &str, dest_port: Option<u16>) -> CapturedFrame {
        let mut frame = CapturedFrame::new(Utc::now(), "eth0", 60);
        frame.protocol = String::from(protocol);
        frame.dest_port = dest_port;
        frame
    }

    #[test]
    fn interesting_frames() {
        assert!(is_interesting(&frame(label::TCP, Some(22))));
        assert!(is_interesting(&frame(label::TCP, Some(443))));
        assert!(!is_interesting(&frame(label::TCP, Some(8080))));
        assert!(!is_interesting(&frame(label::UDP, Some(80))));
        assert!(!is_interesting(&frame(label::TCP, None)));
    }

    #[test]
    fn thread_names_stay_distinct() {
        let (_, receiver) = crossbeam_channel::bounded(1);
        let first = PktThread::new(0, "eth0", receiver.clone());
        let wrapped = PktThread::new(256, "eth256", receiver);
        assert_eq!(first.name(), "tripwire-pkt0");
        assert_eq!(wrapped.name(), "tripwire-pkt256");
    }

    #[test]
    fn drains_until_closed() {
        let (sender, receiver) = crossbeam_channel::bounded(10);
        let thread = PktThread::new(0, "eth0", receiver);
        for port in &[22, 53, 80] {
            sender.send(frame(label::TCP, Some(*port))).unwrap();
        }
        drop(sender);
        assert_eq!(thread.spawn(), 3);
    }
}
