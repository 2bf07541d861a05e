use thiserror::Error;

/// Boxed error coming from the capture library or the operating system
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Interface enumeration failed, nothing depending on the catalog can proceed
    #[error("unable to find any network interfaces: {0}")]
    DiscoveryFailed(#[source] BoxError),

    #[error("interface {0} is not found")]
    InterfaceNotFound(String),

    #[error("interface {0} is not up")]
    InterfaceDown(String),

    #[error("interface {0} is a loopback device")]
    InterfaceIsLoopback(String),

    /// `start` was called on a session that already left the idle state
    #[error("packet capture on {0} has already been started")]
    AlreadySessionRunning(String),

    #[error("failed to open interface {interface}: {source}")]
    OpenFailed {
        interface: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to spawn acquisition thread for {interface}: {source}")]
    Spawn {
        interface: String,
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    /// Whether the caller may skip the affected interface and carry on with the others
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CaptureError::DiscoveryFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_failure_is_fatal() {
        let err = CaptureError::DiscoveryFailed("permission denied".into());
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn open_failure_keeps_source() {
        let err = CaptureError::OpenFailed {
            interface: String::from("eth0"),
            source: "no such device".into(),
        };
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "failed to open interface eth0: no such device"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
