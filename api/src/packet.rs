//! Frame records handed from the rx threads to downstream consumers.
//!
//! A [`RawFrame`] only lives for one iteration of the acquisition loop, it borrows the
//! capture library's buffer. Everything a consumer needs is copied into a [`CapturedFrame`].

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

/// Protocol labels assigned by the classifier
pub mod label {
    pub const TCP: &str = "TCP";
    pub const UDP: &str = "UDP";
    pub const ICMP: &str = "ICMP";
    pub const UNKNOWN: &str = "Unknown";
}

/// A frame as delivered by the capture handle
#[derive(Clone, Copy, Debug)]
pub struct RawFrame<'a> {
    /// Capture time
    pub ts: DateTime<Utc>,
    /// Original length on the wire
    pub len: u32,
    /// Captured bytes, at most snaplen long
    pub data: &'a [u8],
}

/// TCP control flags, declared in the order they are reported
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
pub enum TcpFlag {
    FIN,
    SYN,
    RST,
    PSH,
    ACK,
    URG,
}

impl TcpFlag {
    /// Bit of this flag inside the TCP header's flags byte
    #[inline]
    pub fn mask(&self) -> u8 {
        match self {
            TcpFlag::FIN => 0x01,
            TcpFlag::SYN => 0x02,
            TcpFlag::RST => 0x04,
            TcpFlag::PSH => 0x08,
            TcpFlag::ACK => 0x10,
            TcpFlag::URG => 0x20,
        }
    }

    /// Expand a TCP flags byte into the set flags, in enumeration order
    pub fn from_bits(bits: u8) -> Vec<TcpFlag> {
        TcpFlag::iter().filter(|f| bits & f.mask() != 0).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapturedFrame {
    pub timestamp: DateTime<Utc>,
    pub interface: String,
    /// Total frame length on the wire
    pub length: u32,
    pub protocol: String,
    pub source_ip: Option<IpAddr>,
    pub dest_ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_port: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<TcpFlag>,
    pub payload_size: usize,
    #[serde(skip)]
    pub raw: Option<Vec<u8>>,
}

impl CapturedFrame {
    /// Create an unclassified record, the protocol label starts as `Unknown`
    pub fn new<S: Into<String>>(timestamp: DateTime<Utc>, interface: S, length: u32) -> Self {
        CapturedFrame {
            timestamp,
            interface: interface.into(),
            length,
            protocol: String::from(label::UNKNOWN),
            source_ip: None,
            dest_ip: None,
            source_port: None,
            dest_port: None,
            flags: Vec::new(),
            payload_size: 0,
            raw: None,
        }
    }

    #[inline]
    pub fn is_tcp(&self) -> bool {
        self.protocol == label::TCP
    }

    #[inline]
    pub fn has_flag(&self, flag: TcpFlag) -> bool {
        self.flags.contains(&flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_keep_enumeration_order() {
        // ACK | SYN
        let flags = TcpFlag::from_bits(0x12);
        assert_eq!(flags, vec![TcpFlag::SYN, TcpFlag::ACK]);
        let names: Vec<&str> = flags.iter().map(|f| f.as_ref()).collect();
        assert_eq!(names, vec!["SYN", "ACK"]);
    }

    #[test]
    fn flags_ignore_ece_cwr() {
        assert!(TcpFlag::from_bits(0xc0).is_empty());
        assert_eq!(TcpFlag::from_bits(0x3f).len(), 6);
    }

    #[test]
    fn new_frame_is_unknown() {
        let frame = CapturedFrame::new(Utc::now(), "eth0", 60);
        assert_eq!(frame.protocol, label::UNKNOWN);
        assert_eq!(frame.length, 60);
        assert!(frame.source_port.is_none());
        assert!(!frame.is_tcp());
    }

    #[test]
    fn serialize_skips_raw_and_empty_fields() {
        let mut frame = CapturedFrame::new(Utc::now(), "eth0", 60);
        frame.raw = Some(vec![0u8; 60]);
        let s = serde_json::to_string(&frame).unwrap();
        assert!(!s.contains("raw"));
        assert!(!s.contains("flags"));
        assert!(!s.contains("source_port"));

        frame.flags = vec![TcpFlag::SYN];
        let s = serde_json::to_string(&frame).unwrap();
        assert!(s.contains(r#""flags":["SYN"]"#));
    }
}
