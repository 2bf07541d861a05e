use nom::bytes::complete::take;
use nom::IResult;

use crate::dissectors::{Error, NetworkFamily};

/// BSD loopback header: a 4 byte address family in host byte order (network order for DLT_LOOP)
pub fn dissect(data: &[u8]) -> IResult<&[u8], NetworkFamily, Error> {
    let (remain, hdr) = take(4usize)(data)?;

    // address families are small, the non zero byte tells the byte order
    let family = if hdr[0] != 0 { hdr[0] } else { hdr[3] };
    let family = match family {
        2 => NetworkFamily::IPV4,
        // OSI packets
        7 => {
            return Err(nom::Err::Error(Error::UnsupportProtocol(
                "Does not support OSI packet",
            )))
        }
        // IPX packets
        23 => {
            return Err(nom::Err::Error(Error::UnsupportProtocol(
                "Does not support IPX packet",
            )))
        }
        24 | 28 | 30 => NetworkFamily::IPV6,
        _ => return Err(nom::Err::Error(Error::UnknownProtocol)),
    };

    Ok((remain, family))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_host_order() {
        let buf = [0x02, 0x00, 0x00, 0x00, 0x45];
        let (remain, family) = dissect(&buf).unwrap();
        assert_eq!(family, NetworkFamily::IPV4);
        assert_eq!(remain.len(), 1);
    }

    #[test]
    fn ipv6_network_order() {
        let buf = [0x00, 0x00, 0x00, 0x1e];
        assert!(matches!(dissect(&buf), Ok((_, NetworkFamily::IPV6))));
    }

    #[test]
    fn osi() {
        let buf = [0x07, 0x00, 0x00, 0x00];
        assert!(matches!(
            dissect(&buf),
            Err(nom::Err::Error(Error::UnsupportProtocol(_)))
        ));
    }

    #[test]
    fn too_short() {
        let buf = [0x02, 0x00];
        assert!(matches!(dissect(&buf), Err(nom::Err::Error(_))));
    }
}
