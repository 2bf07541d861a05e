use nom::bytes::complete::take;
use nom::number::complete::be_u16;
use nom::sequence::tuple;
use nom::IResult;

use crate::dissectors::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Udp {
    pub src_port: u16,
    pub dst_port: u16,
}

/// Parse a UDP header, the payload is bounded by the header's length field when it is sane
pub fn dissect(data: &[u8]) -> IResult<&[u8], Udp, Error> {
    let (remain, hdr) = take(8usize)(data)?;
    let (_, (src_port, dst_port, length)) = tuple((be_u16, be_u16, be_u16))(hdr)?;

    let length = length as usize;
    let payload = if length >= 8 && length - 8 <= remain.len() {
        &remain[..length - 8]
    } else {
        remain
    };

    Ok((payload, Udp { src_port, dst_port }))
}
