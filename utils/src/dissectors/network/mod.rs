pub mod icmp;
pub mod ipv4;
pub mod ipv6;

pub use ipv4::Ipv4;
pub use ipv6::Ipv6;

/// IANA assigned internet protocol numbers
pub mod ip_proto {
    pub const HOPOPT: u8 = 0;
    pub const ICMP: u8 = 1;
    pub const IGMP: u8 = 2;
    pub const IPIP: u8 = 4;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const IPV6: u8 = 41;
    pub const IPV6_ROUTE: u8 = 43;
    pub const IPV6_FRAG: u8 = 44;
    pub const GRE: u8 = 47;
    pub const ESP: u8 = 50;
    pub const AH: u8 = 51;
    pub const ICMPV6: u8 = 58;
    pub const IPV6_NONXT: u8 = 59;
    pub const IPV6_OPTS: u8 = 60;
    pub const SCTP: u8 = 132;
}

/// Label for the protocol a network layer header says comes next
pub fn protocol_name(protocol: u8) -> String {
    let name = match protocol {
        ip_proto::ICMP => "ICMPv4",
        ip_proto::IGMP => "IGMP",
        ip_proto::IPIP => "IPIP",
        ip_proto::TCP => "TCP",
        ip_proto::UDP => "UDP",
        ip_proto::IPV6 => "IPv6",
        ip_proto::GRE => "GRE",
        ip_proto::ESP => "ESP",
        ip_proto::AH => "AH",
        ip_proto::ICMPV6 => "ICMPv6",
        ip_proto::SCTP => "SCTP",
        n => return format!("IPProto({})", n),
    };
    String::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(protocol_name(ip_proto::ICMP), "ICMPv4");
        assert_eq!(protocol_name(ip_proto::GRE), "GRE");
        assert_eq!(protocol_name(ip_proto::ICMPV6), "ICMPv6");
        assert_eq!(protocol_name(253), "IPProto(253)");
    }
}
