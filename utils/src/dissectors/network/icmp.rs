use nom::bytes::complete::take;
use nom::IResult;

use crate::dissectors::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Icmp {
    pub icmp_type: u8,
    pub code: u8,
}

/// ICMPv4 header: type, code, checksum and 4 bytes of rest of header
pub fn dissect(data: &[u8]) -> IResult<&[u8], Icmp, Error> {
    let (remain, hdr) = take(8usize)(data)?;
    Ok((
        remain,
        Icmp {
            icmp_type: hdr[0],
            code: hdr[1],
        },
    ))
}
