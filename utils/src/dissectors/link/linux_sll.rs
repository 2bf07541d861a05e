use nom::bytes::complete::take;
use nom::number::complete::be_u16;
use nom::IResult;
use num_traits::FromPrimitive;

use crate::dissectors::{Error, EtherType, NetworkFamily};

/// Linux cooked capture v1, a 16 byte pseudo header ending with the protocol type
pub fn dissect(data: &[u8]) -> IResult<&[u8], NetworkFamily, Error> {
    let (remain, hdr) = take(16usize)(data)?;
    let (_, protocol) = be_u16(&hdr[14..])?;
    match EtherType::from_u16(protocol).and_then(|e| e.network_family()) {
        Some(family) => Ok((remain, family)),
        None => Err(nom::Err::Error(Error::UnknownEtype(protocol))),
    }
}
