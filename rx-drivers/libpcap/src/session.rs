//! One capture session per interface.
//!
//! A session goes `Idle -> Running -> Stopped` and never back. While running, a dedicated
//! rx thread owns the capture handle, classifies every frame, accounts it in the session's
//! statistics and pushes it into a bounded output queue without ever blocking on it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{error, warn};

use tripwire_api as api;
use tripwire_utils as utils;
use api::config::SessionConfig;
use api::error::CaptureError;
use api::events::{CaptureEvents, TracingEvents};
use api::packet::CapturedFrame;
use api::stats::{SharedStats, StatsAggregate};

use crate::catalog::InterfaceCatalog;
use crate::interfaces::{Publisher, RxThread};
use crate::{LiveOpener, Opener};

/// Capacity of every session's output queue, unrelated to the OS capture buffer size
pub const OUTPUT_QUEUE_CAPACITY: usize = 1000;

/// Read timeout used when the configured one does not parse
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
}

/// Parse a configured read timeout, falling back to one second
pub fn resolve_timeout(timeout: &str) -> Duration {
    match utils::duration::parse(timeout) {
        Ok(d) => d,
        Err(e) => {
            warn!(
                "{}, using default timeout of {:?}",
                e, FALLBACK_TIMEOUT
            );
            FALLBACK_TIMEOUT
        }
    }
}

/// Read only view of a session's counters, usable from other threads
#[derive(Clone, Debug)]
pub struct SessionStats {
    interface: String,
    stats: SharedStats,
    overload: Arc<AtomicU64>,
}

impl SessionStats {
    pub fn interface_name(&self) -> &str {
        self.interface.as_str()
    }

    pub fn snapshot(&self) -> StatsAggregate {
        self.stats.snapshot()
    }

    /// Frames discarded because the output queue was full
    pub fn overload_dropped(&self) -> u64 {
        self.overload.load(Ordering::Relaxed)
    }
}

pub struct CaptureSession {
    cfg: SessionConfig,
    state: SessionState,
    exit: Arc<AtomicBool>,
    stats: SharedStats,
    overload: Arc<AtomicU64>,
    /// Handed to the rx thread on start
    sender: Option<Sender<CapturedFrame>>,
    receiver: Receiver<CapturedFrame>,
    handle: Option<JoinHandle<()>>,
    opener: Arc<dyn Opener>,
    events: Arc<dyn CaptureEvents>,
}

impl CaptureSession {
    /// Session capturing through libpcap and reporting events to `tracing`
    pub fn new(cfg: SessionConfig) -> Self {
        Self::with_opener(cfg, Arc::new(LiveOpener), Arc::new(TracingEvents))
    }

    pub fn with_opener(
        cfg: SessionConfig,
        opener: Arc<dyn Opener>,
        events: Arc<dyn CaptureEvents>,
    ) -> Self {
        Self::with_capacity(cfg, opener, events, OUTPUT_QUEUE_CAPACITY)
    }

    fn with_capacity(
        cfg: SessionConfig,
        opener: Arc<dyn Opener>,
        events: Arc<dyn CaptureEvents>,
        capacity: usize,
    ) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        CaptureSession {
            cfg,
            state: SessionState::Idle,
            exit: Arc::new(AtomicBool::new(false)),
            stats: SharedStats::new(),
            overload: Arc::new(AtomicU64::new(0)),
            sender: Some(sender),
            receiver,
            handle: None,
            opener,
            events,
        }
    }

    /// Validate the configured interface against the catalog before building the session
    pub fn for_interface(catalog: &InterfaceCatalog, cfg: SessionConfig) -> Result<Self, CaptureError> {
        catalog.validate(&cfg.name)?;
        Ok(Self::new(cfg))
    }

    /// Open the capture handle and launch the rx thread
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Idle {
            return Err(CaptureError::AlreadySessionRunning(self.cfg.name.clone()));
        }

        let timeout = resolve_timeout(&self.cfg.timeout);
        let cap = self
            .opener
            .open(&self.cfg, timeout)
            .map_err(|source| CaptureError::OpenFailed {
                interface: self.cfg.name.clone(),
                source,
            })?;

        let sender = match self.sender.take() {
            Some(sender) => sender,
            None => return Err(CaptureError::AlreadySessionRunning(self.cfg.name.clone())),
        };

        let thread = RxThread {
            exit: self.exit.clone(),
            interface: self.cfg.name.clone(),
            retain_raw: self.cfg.retain_raw,
            cap,
            stats: self.stats.clone(),
            publisher: Publisher {
                sender,
                overload: self.overload.clone(),
                events: self.events.clone(),
                interface: self.cfg.name.clone(),
            },
            events: self.events.clone(),
        };

        let builder = std::thread::Builder::new().name(thread.name());
        match builder.spawn(move || thread.spawn()) {
            Ok(hdl) => {
                self.handle = Some(hdl);
                self.state = SessionState::Running;
                self.events.interface_started(&self.cfg.name);
                Ok(())
            }
            Err(source) => {
                // the queue producer went down with the closure
                self.state = SessionState::Stopped;
                Err(CaptureError::Spawn {
                    interface: self.cfg.name.clone(),
                    source,
                })
            }
        }
    }

    /// Ask the rx thread to exit and wait for it, no-op unless running
    pub fn stop(&mut self) {
        if self.state != SessionState::Running {
            return;
        }

        self.exit.store(true, Ordering::SeqCst);
        self.state = SessionState::Stopped;
        if let Some(hdl) = self.handle.take() {
            if hdl.join().is_err() {
                error!(
                    interface = self.cfg.name.as_str(),
                    "Acquisition thread panicked"
                );
            }
        }
        self.events.capture_stopped(&self.cfg.name);
    }

    /// Consistent snapshot of the session's statistics
    pub fn stats(&self) -> StatsAggregate {
        self.stats.snapshot()
    }

    pub fn stats_handle(&self) -> SessionStats {
        SessionStats {
            interface: self.cfg.name.clone(),
            stats: self.stats.clone(),
            overload: self.overload.clone(),
        }
    }

    /// Consumer end of the output queue, closed once the rx thread exits
    pub fn frames(&self) -> Receiver<CapturedFrame> {
        self.receiver.clone()
    }

    pub fn interface_name(&self) -> &str {
        self.cfg.name.as_str()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    /// Running and the rx thread is still reading. A session whose handle ran dry stays in
    /// [`SessionState::Running`] until [`stop`](Self::stop) but is not running anymore.
    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running && !self.acquisition_finished()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn overload_dropped(&self) -> u64 {
        self.overload.load(Ordering::Relaxed)
    }

    /// Whether the rx thread has returned on its own, e.g. after a read error
    pub fn acquisition_finished(&self) -> bool {
        match &self.handle {
            Some(hdl) => hdl.is_finished(),
            None => self.state == SessionState::Stopped,
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}
