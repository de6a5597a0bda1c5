//! Error types for beaconlink core.

use thiserror::Error;

/// Core error type for discovery and connect operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Connect to {host}:{port} timed out after {timeout_ms} ms")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout_ms: u64,
    },

    #[error("Connect to {host}:{port} failed: {message}")]
    ConnectFailed {
        host: String,
        port: u16,
        message: String,
    },

    #[error("Target is not connectable: {0}")]
    Unresolvable(String),

    #[error("{0}")]
    Other(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Classify a transport error as transient.
///
/// Transient errors are swallowed by the datagram handler (the operation is
/// treated as "did not happen"); anything unrecognized propagates out of the
/// current handler invocation.
pub fn is_transient(err: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    matches!(
        err.kind(),
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable
            | ErrorKind::TimedOut
            | ErrorKind::WouldBlock
            | ErrorKind::Interrupted
    )
}

/// Collaborator-supplied sink for connect failures.
///
/// The stream connector reports timeouts and transport failures here instead
/// of raising them out of the event-processing context.
pub trait ErrorSink: Send + Sync {
    fn report(&self, err: &CoreError);
}

/// Default sink: one line to stderr.
pub struct StderrSink;

impl ErrorSink for StderrSink {
    fn report(&self, err: &CoreError) {
        eprintln!("Connection error: {}", err);
    }
}
