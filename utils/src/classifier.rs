//! Map a raw frame into a [`CapturedFrame`].
//!
//! Decoding happens once per frame and yields a [`Decoded`] variant, each variant has its own
//! classify function. Truncated or malformed layers are never an error: the record keeps
//! whatever the outer layers produced.

use std::net::IpAddr;

use tripwire_api::packet::{label, CapturedFrame, RawFrame, TcpFlag};

use crate::dissectors::network::icmp::{self, Icmp};
use crate::dissectors::network::{self, ip_proto, ipv4, ipv6, Ipv4, Ipv6};
use crate::dissectors::transport::{tcp, udp, Tcp, Udp};
use crate::dissectors::{link, LinkType, NetworkFamily};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    V4(Ipv4),
    V6(Ipv6),
}

impl Network {
    pub fn src(&self) -> IpAddr {
        match self {
            Network::V4(ip) => IpAddr::V4(ip.src),
            Network::V6(ip) => IpAddr::V6(ip.src),
        }
    }

    pub fn dst(&self) -> IpAddr {
        match self {
            Network::V4(ip) => IpAddr::V4(ip.dst),
            Network::V6(ip) => IpAddr::V6(ip.dst),
        }
    }

    /// Part of a fragmented datagram, the payload can't be read as a transport header
    pub fn is_fragment(&self) -> bool {
        match self {
            Network::V4(ip) => ip.fragment,
            Network::V6(ip) => ip.fragment,
        }
    }

    /// Protocol number of the layer after this one
    pub fn next_protocol(&self) -> u8 {
        match self {
            Network::V4(ip) => ip.protocol,
            Network::V6(ip) => ip.next_header,
        }
    }
}

/// Outcome of decoding one frame, the payload slices borrow the frame data
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decoded<'a> {
    Tcp(Network, Tcp, &'a [u8]),
    Udp(Network, Udp, &'a [u8]),
    Icmp(Network, Icmp, &'a [u8]),
    /// Network layer decoded, transport layer missing, unsupported or truncated
    Network(Network),
    Unknown,
}

pub fn decode(link_type: LinkType, data: &[u8]) -> Decoded<'_> {
    let (data, family) = match link::dissect(link_type, data) {
        Ok(r) => r,
        Err(_) => return Decoded::Unknown,
    };

    let (payload, net) = match family {
        NetworkFamily::IPV4 => match ipv4::dissect(data) {
            Ok((payload, ip)) => (payload, Network::V4(ip)),
            Err(_) => return Decoded::Unknown,
        },
        NetworkFamily::IPV6 => match ipv6::dissect(data) {
            Ok((payload, ip)) => (payload, Network::V6(ip)),
            Err(_) => return Decoded::Unknown,
        },
    };

    if net.is_fragment() {
        return Decoded::Network(net);
    }

    match (net, net.next_protocol()) {
        (_, ip_proto::TCP) => match tcp::dissect(payload) {
            Ok((payload, hdr)) => Decoded::Tcp(net, hdr, payload),
            Err(_) => Decoded::Network(net),
        },
        (_, ip_proto::UDP) => match udp::dissect(payload) {
            Ok((payload, hdr)) => Decoded::Udp(net, hdr, payload),
            Err(_) => Decoded::Network(net),
        },
        (Network::V4(_), ip_proto::ICMP) => match icmp::dissect(payload) {
            Ok((payload, hdr)) => Decoded::Icmp(net, hdr, payload),
            Err(_) => Decoded::Network(net),
        },
        _ => Decoded::Network(net),
    }
}

/// Classify a frame captured on `interface`, raw bytes are copied only when `retain_raw` is set
///
/// IP fragments keep the provisional label and carry no ports or flags. For ICMP the payload
/// size is the number of bytes after the 8-byte ICMP header, not 0.
pub fn classify(
    link_type: LinkType,
    frame: &RawFrame<'_>,
    interface: &str,
    retain_raw: bool,
) -> CapturedFrame {
    let mut record = CapturedFrame::new(frame.ts, interface, frame.len);

    match decode(link_type, frame.data) {
        Decoded::Tcp(net, hdr, payload) => classify_tcp(&mut record, &net, &hdr, payload),
        Decoded::Udp(net, hdr, payload) => classify_udp(&mut record, &net, &hdr, payload),
        Decoded::Icmp(net, _, payload) => classify_icmp(&mut record, &net, payload),
        Decoded::Network(net) => classify_network(&mut record, &net),
        Decoded::Unknown => {}
    };

    if retain_raw {
        record.raw = Some(frame.data.to_vec());
    }
    record
}

fn classify_network(record: &mut CapturedFrame, net: &Network) {
    record.source_ip = Some(net.src());
    record.dest_ip = Some(net.dst());
    record.protocol = network::protocol_name(net.next_protocol());
}

fn classify_tcp(record: &mut CapturedFrame, net: &Network, hdr: &Tcp, payload: &[u8]) {
    classify_network(record, net);
    record.protocol = String::from(label::TCP);
    record.source_port = Some(hdr.src_port);
    record.dest_port = Some(hdr.dst_port);
    record.flags = TcpFlag::from_bits(hdr.flags);
    record.payload_size = payload.len();
}

fn classify_udp(record: &mut CapturedFrame, net: &Network, hdr: &Udp, payload: &[u8]) {
    classify_network(record, net);
    record.protocol = String::from(label::UDP);
    record.source_port = Some(hdr.src_port);
    record.dest_port = Some(hdr.dst_port);
    record.payload_size = payload.len();
}

fn classify_icmp(record: &mut CapturedFrame, net: &Network, payload: &[u8]) {
    classify_network(record, net);
    record.protocol = String::from(label::ICMP);
    record.payload_size = payload.len();
}
