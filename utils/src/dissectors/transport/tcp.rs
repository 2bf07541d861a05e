use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u8};
use nom::sequence::tuple;
use nom::IResult;

use crate::dissectors::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tcp {
    pub src_port: u16,
    pub dst_port: u16,
    /// Raw flags byte, CWR and ECE included
    pub flags: u8,
}

/// Parse a TCP header including options, the remaining bytes are the segment payload
pub fn dissect(data: &[u8]) -> IResult<&[u8], Tcp, Error> {
    let (_, fixed) = take(20usize)(data)?;
    let (_, (src_port, dst_port)) = tuple((be_u16, be_u16))(fixed)?;
    let (_, (offset, flags)) = tuple((be_u8, be_u8))(&fixed[12..])?;

    let header_len = ((offset >> 4) as usize) * 4;
    if header_len < 20 {
        return Err(nom::Err::Error(Error::CorruptPacket(
            "TCP data offset is smaller than 5",
        )));
    }

    let (remain, _) = take(header_len)(data)?;
    Ok((
        remain,
        Tcp {
            src_port,
            dst_port,
            flags,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syn_ack() {
        let buf = [
            0x01, 0xbb, 0xc7, 0x38, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x50, 0x12,
            0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x68, 0x69,
        ];
        let (remain, tcp) = dissect(&buf).unwrap();
        assert_eq!(tcp.src_port, 443);
        assert_eq!(tcp.dst_port, 51000);
        assert_eq!(tcp.flags, 0x12);
        assert_eq!(remain, b"hi");
    }

    #[test]
    fn with_options() {
        let mut buf = vec![
            0x00, 0x16, 0xd4, 0x31, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x60, 0x02,
            0xff, 0xff, 0x00, 0x00, 0x00, 0x00,
        ];
        // mss option
        buf.extend_from_slice(&[0x02, 0x04, 0x05, 0xb4]);
        let (remain, tcp) = dissect(&buf).unwrap();
        assert_eq!(tcp.dst_port, 54321);
        assert!(remain.is_empty());
    }

    #[test]
    fn bad_data_offset() {
        let mut buf = [0u8; 20];
        buf[12] = 0x40;
        assert!(matches!(
            dissect(&buf),
            Err(nom::Err::Error(Error::CorruptPacket(_)))
        ));
    }

    #[test]
    fn options_truncated() {
        let mut buf = [0u8; 20];
        buf[12] = 0x80;
        assert!(matches!(dissect(&buf), Err(nom::Err::Error(_))));
    }
}
