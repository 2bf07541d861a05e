use nom::IResult;

use super::{Error, NetworkFamily};

pub mod ethernet;
pub mod linux_sll;
pub mod null;
pub mod raw;

/// Data link types a live handle may report
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkType {
    /// BSD loopback encapsulation, DLT_NULL and DLT_LOOP
    NULL,
    ETHERNET,
    /// Raw IPv4 or IPv6 without any link header
    RAW,
    /// Linux cooked capture, used by the "any" device
    LINUX_SLL,
    Other(i32),
}

impl LinkType {
    /// Map a libpcap DLT/LINKTYPE value
    pub fn from_dlt(dlt: i32) -> Self {
        match dlt {
            0 | 108 => LinkType::NULL,
            1 => LinkType::ETHERNET,
            12 | 14 | 101 | 228 | 229 => LinkType::RAW,
            113 => LinkType::LINUX_SLL,
            other => LinkType::Other(other),
        }
    }
}

/// Strip the link layer header and report which network layer follows
pub fn dissect(link_type: LinkType, data: &[u8]) -> IResult<&[u8], NetworkFamily, Error> {
    match link_type {
        LinkType::ETHERNET => ethernet::dissect(data),
        LinkType::NULL => null::dissect(data),
        LinkType::RAW => raw::dissect(data),
        LinkType::LINUX_SLL => linux_sll::dissect(data),
        LinkType::Other(_) => Err(nom::Err::Error(Error::UnsupportProtocol(
            "Unsupported link type",
        ))),
    }
}
