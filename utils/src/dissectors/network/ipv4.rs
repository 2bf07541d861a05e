use std::net::Ipv4Addr;

use nom::bytes::complete::take;
use nom::IResult;

use crate::dissectors::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ipv4 {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    /// Next level protocol
    pub protocol: u8,
    /// Non-zero fragment offset or more fragments flag set
    pub fragment: bool,
}

/// Parse an IPv4 header, the remaining bytes are the payload trimmed to the declared total length
pub fn dissect(data: &[u8]) -> IResult<&[u8], Ipv4, Error> {
    let (_, fixed) = take(20usize)(data)?;

    if fixed[0] >> 4 != 4 {
        return Err(nom::Err::Error(Error::CorruptPacket(
            "Invalid IPv4 version",
        )));
    }

    let ihl = ((fixed[0] & 0x0f) as usize) * 4;
    if ihl < 20 {
        return Err(nom::Err::Error(Error::CorruptPacket(
            "IPv4 header length is smaller than 20",
        )));
    }

    let total_len = u16::from_be_bytes([fixed[2], fixed[3]]) as usize;
    // TSO'd packets report a zero total length
    let end = match total_len {
        0 => data.len(),
        n if n < ihl => {
            return Err(nom::Err::Error(Error::CorruptPacket(
                "IPv4 total length is smaller than header length",
            )))
        }
        n => n.min(data.len()),
    };

    let (_, options_included) = take(ihl)(data)?;
    let ip = Ipv4 {
        src: Ipv4Addr::new(fixed[12], fixed[13], fixed[14], fixed[15]),
        dst: Ipv4Addr::new(fixed[16], fixed[17], fixed[18], fixed[19]),
        protocol: fixed[9],
        fragment: u16::from_be_bytes([fixed[6], fixed[7]]) & 0x3fff != 0,
    };

    Ok((&data[options_included.len()..end], ip))
}
