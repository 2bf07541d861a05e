//! Layer dissectors used by the frame classifier.
//!
//! Every dissector takes the bytes starting at its own layer and returns the remaining
//! bytes (its payload) together with the header fields the classifier cares about.
//! Nothing here tries to validate checksums or reassemble anything.

use std::fmt::{Display, Formatter};

use nom::error::{ErrorKind, ParseError};

mod etype;
pub mod link;
pub mod network;
pub mod transport;

pub use etype::EtherType;
pub use link::LinkType;

#[derive(Debug)]
pub enum Error {
    UnsupportProtocol(&'static str),
    CorruptPacket(&'static str),
    UnknownProtocol,
    UnknownEtype(u16),
    Nom(ErrorKind),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownProtocol => write!(f, "Unknown Protocol"),
            Error::UnknownEtype(etype) => write!(f, "Unknown etype({:#06x})", etype),
            Error::UnsupportProtocol(s) | Error::CorruptPacket(s) => write!(f, "{}", s),
            Error::Nom(_) => write!(f, "Nom parse error",),
        }
    }
}

impl<I> ParseError<I> for Error {
    fn from_error_kind(_: I, kind: ErrorKind) -> Self {
        Error::Nom(kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl std::error::Error for Error {}

/// Network layer carried by a link layer frame
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NetworkFamily {
    IPV4,
    IPV6,
}
