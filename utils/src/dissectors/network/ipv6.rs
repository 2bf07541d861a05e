use std::convert::TryFrom;
use std::net::Ipv6Addr;

use nom::bytes::complete::take;
use nom::IResult;

use super::ip_proto;
use crate::dissectors::Error;

/// Upper bound of extension headers walked before giving up
const MAX_EXT_HEADERS: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ipv6 {
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
    /// Next header after the skipped extension headers
    pub next_header: u8,
    /// A fragment header with a non-zero offset or the more fragments flag was found
    pub fragment: bool,
}

/// Parse the fixed IPv6 header and skip hop-by-hop, routing, fragment and
/// destination options headers.
///
/// A truncated extension header stops the walk, `next_header` then names the
/// extension header that could not be read. The walk also stops after the
/// fragment header of a fragmented packet, the rest is not a header.
pub fn dissect(data: &[u8]) -> IResult<&[u8], Ipv6, Error> {
    let (remain, fixed) = take(40usize)(data)?;

    if fixed[0] >> 4 != 6 {
        return Err(nom::Err::Error(Error::CorruptPacket(
            "Invalid IPv6 version",
        )));
    }

    let payload_len = u16::from_be_bytes([fixed[4], fixed[5]]) as usize;
    let mut remain = match payload_len {
        // jumbogram
        0 => remain,
        n => &remain[..n.min(remain.len())],
    };

    let mut next_header = fixed[6];
    let mut fragment = false;
    for _ in 0..MAX_EXT_HEADERS {
        let ext_len = match next_header {
            ip_proto::HOPOPT | ip_proto::IPV6_ROUTE | ip_proto::IPV6_OPTS => match remain.get(1) {
                Some(len) => (*len as usize + 1) * 8,
                None => break,
            },
            ip_proto::IPV6_FRAG => 8,
            _ => break,
        };
        if remain.len() < ext_len {
            break;
        }
        if next_header == ip_proto::IPV6_FRAG {
            fragment = u16::from_be_bytes([remain[2], remain[3]]) & 0xfff9 != 0;
        }
        next_header = remain[0];
        remain = &remain[ext_len..];
        if fragment {
            break;
        }
    }

    let ip = Ipv6 {
        src: addr(&fixed[8..24]),
        dst: addr(&fixed[24..40]),
        next_header,
        fragment,
    };
    Ok((remain, ip))
}

fn addr(octets: &[u8]) -> Ipv6Addr {
    let mut buf = [0u8; 16];
    if let Ok(o) = <&[u8; 16]>::try_from(octets) {
        buf = *o;
    }
    Ipv6Addr::from(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(payload_len: u16, next_header: u8) -> Vec<u8> {
        let mut buf = vec![0x60, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&payload_len.to_be_bytes());
        buf.push(next_header);
        buf.push(64);
        // fe80::1
        buf.extend_from_slice(&[0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01]);
        // fe80::2
        buf.extend_from_slice(&[0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02]);
        buf
    }

    #[test]
    fn ok() {
        let mut buf = header(4, ip_proto::UDP);
        buf.extend_from_slice(&[0x00, 0x35, 0x00, 0x35, 0xff]);
        let (remain, ip) = dissect(&buf).unwrap();
        assert_eq!(ip.src, "fe80::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(ip.dst, "fe80::2".parse::<Ipv6Addr>().unwrap());
        assert_eq!(ip.next_header, ip_proto::UDP);
        assert_eq!(remain.len(), 4);
    }

    #[test]
    fn skip_ext_headers() {
        let mut buf = header(24, ip_proto::HOPOPT);
        // hop-by-hop, 8 bytes, next is fragment
        buf.extend_from_slice(&[ip_proto::IPV6_FRAG, 0, 0, 0, 0, 0, 0, 0]);
        // fragment, next is tcp
        buf.extend_from_slice(&[ip_proto::TCP, 0, 0, 0, 0, 0, 0, 0]);
        buf.extend_from_slice(&[0xaa; 8]);
        let (remain, ip) = dissect(&buf).unwrap();
        assert_eq!(ip.next_header, ip_proto::TCP);
        assert!(!ip.fragment);
        assert_eq!(remain, &[0xaa; 8]);
    }

    #[test]
    fn fragment_header() {
        let mut buf = header(24, ip_proto::IPV6_FRAG);
        // offset 0, more fragments
        buf.extend_from_slice(&[ip_proto::UDP, 0, 0x00, 0x01, 0, 0, 0, 1]);
        buf.extend_from_slice(&[0xbb; 16]);
        let (remain, ip) = dissect(&buf).unwrap();
        assert!(ip.fragment);
        assert_eq!(ip.next_header, ip_proto::UDP);
        assert_eq!(remain, &[0xbb; 16]);

        // offset 0x40, last fragment, payload looks like a routing header
        buf[40] = ip_proto::IPV6_ROUTE;
        buf[42] = 0x02;
        buf[43] = 0x00;
        buf[49] = 0;
        let (remain, ip) = dissect(&buf).unwrap();
        assert!(ip.fragment);
        assert_eq!(ip.next_header, ip_proto::IPV6_ROUTE);
        assert_eq!(remain.len(), 16);
    }

    #[test]
    fn truncated_ext_header() {
        let mut buf = header(4, ip_proto::IPV6_ROUTE);
        buf.extend_from_slice(&[ip_proto::TCP, 2, 0, 0]);
        let (remain, ip) = dissect(&buf).unwrap();
        assert_eq!(ip.next_header, ip_proto::IPV6_ROUTE);
        assert_eq!(remain.len(), 4);
    }

    #[test]
    fn pkt_too_short() {
        let buf = header(0, ip_proto::TCP);
        assert!(matches!(dissect(&buf[..39]), Err(nom::Err::Error(_))));
    }

    #[test]
    fn wrong_version() {
        let mut buf = header(0, ip_proto::TCP);
        buf[0] = 0x45;
        assert!(matches!(
            dissect(&buf),
            Err(nom::Err::Error(Error::CorruptPacket(_)))
        ));
    }
}
