use nom::number::complete::be_u8;
use nom::IResult;

use crate::dissectors::{Error, NetworkFamily};

/// Raw IP has no link header, the version nibble tells the network layer
pub fn dissect(data: &[u8]) -> IResult<&[u8], NetworkFamily, Error> {
    let (_, vhl) = be_u8(data)?;
    match vhl >> 4 {
        4 => Ok((data, NetworkFamily::IPV4)),
        6 => Ok((data, NetworkFamily::IPV6)),
        _ => Err(nom::Err::Error(Error::CorruptPacket(
            "Raw packet is neither IPv4 nor IPv6",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_nibble() {
        assert!(matches!(dissect(&[0x45]), Ok((_, NetworkFamily::IPV4))));
        assert!(matches!(dissect(&[0x60]), Ok((_, NetworkFamily::IPV6))));
        assert!(matches!(
            dissect(&[0x20]),
            Err(nom::Err::Error(Error::CorruptPacket(_)))
        ));
        assert!(matches!(dissect(&[]), Err(nom::Err::Error(_))));
    }
}
