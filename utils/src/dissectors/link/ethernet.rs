use nom::bytes::complete::take;
use nom::number::complete::be_u16;
use nom::IResult;
use num_traits::FromPrimitive;

use crate::dissectors::{Error, EtherType, NetworkFamily};

/// Max number of stacked 802.1Q/802.1ad tags
const MAX_VLAN_TAGS: usize = 4;

pub fn dissect(data: &[u8]) -> IResult<&[u8], NetworkFamily, Error> {
    let (remain, hdr) = take(14usize)(data)?;
    let (_, mut etype) = be_u16(&hdr[12..])?;
    let mut remain = remain;

    for _ in 0..MAX_VLAN_TAGS {
        match EtherType::from_u16(etype) {
            Some(e) if e.is_vlan_tag() => {
                let (r, tag) = take(4usize)(remain)?;
                let (_, inner) = be_u16(&tag[2..])?;
                etype = inner;
                remain = r;
            }
            _ => break,
        }
    }

    match EtherType::from_u16(etype).and_then(|e| e.network_family()) {
        Some(family) => Ok((remain, family)),
        None => Err(nom::Err::Error(Error::UnknownEtype(etype))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x08, 0x00,
            0x45,
        ];
        let (remain, family) = dissect(&buf).unwrap();
        assert_eq!(family, NetworkFamily::IPV4);
        assert_eq!(remain, &[0x45]);
    }

    #[test]
    fn pkt_too_short() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00,
        ];
        let result = dissect(&buf);
        assert!(matches!(result, Err(nom::Err::Error(_))));
    }

    #[test]
    fn unkown_etype() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x08, 0x06,
        ];
        let result = dissect(&buf);
        assert!(matches!(
            result,
            Err(nom::Err::Error(Error::UnknownEtype(0x0806)))
        ));
    }

    #[test]
    fn vlan_tagged() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x81, 0x00,
            0x00, 0x64, 0x86, 0xdd, 0x60,
        ];
        let (remain, family) = dissect(&buf).unwrap();
        assert_eq!(family, NetworkFamily::IPV6);
        assert_eq!(remain, &[0x60]);
    }

    #[test]
    fn truncated_vlan_tag() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x81, 0x00,
            0x00, 0x64,
        ];
        assert!(matches!(dissect(&buf), Err(nom::Err::Error(_))));
    }
}
