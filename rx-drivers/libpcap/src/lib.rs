//! libpcap backed live capture: interface discovery and per interface capture sessions.

use std::time::Duration;

use tripwire_api as api;
use tripwire_utils as utils;
use api::config::SessionConfig;
use api::error::BoxError;
use api::packet::RawFrame;
use api::stats::RxStat;
use utils::dissectors::LinkType;

pub mod catalog;
mod interfaces;
pub mod session;

pub use catalog::{InterfaceCatalog, InterfaceRecord, InterfaceSource, PcapDevices};
pub use session::{CaptureSession, SessionState, SessionStats, OUTPUT_QUEUE_CAPACITY};

/// Result of one read attempt on a capture handle
#[derive(Debug)]
pub enum Read<'a> {
    Frame(RawFrame<'a>),
    /// The read timeout expired without any frame
    Timeout,
    /// The handle will never deliver another frame
    Eof,
}

/// A live capture handle, owned by exactly one rx thread and closed when dropped
pub trait CaptureUnit: Send {
    fn link_type(&self) -> LinkType;

    /// Wait for the next frame, at most for the handle's read timeout
    fn next(&mut self) -> Result<Read<'_>, BoxError>;

    fn stats(&mut self) -> Result<RxStat, BoxError> {
        Ok(RxStat::default())
    }
}

/// Opens capture handles for sessions
pub trait Opener: Send + Sync {
    fn open(&self, cfg: &SessionConfig, timeout: Duration) -> Result<Box<dyn CaptureUnit>, BoxError>;
}

/// Opens libpcap live handles on network interfaces
#[derive(Clone, Copy, Debug, Default)]
pub struct LiveOpener;

impl Opener for LiveOpener {
    fn open(&self, cfg: &SessionConfig, timeout: Duration) -> Result<Box<dyn CaptureUnit>, BoxError> {
        let cap = interfaces::NetworkInterface::open(cfg, timeout)?;
        Ok(Box::new(cap))
    }
}
