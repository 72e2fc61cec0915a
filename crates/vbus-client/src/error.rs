//! Error types for the VBUS client.

use thiserror::Error;
use vbus_protocol::ProtocolError;

use crate::mode::Mode;

/// Errors that can occur on a VBUS connection.
#[derive(Debug, Error)]
pub enum VbusError {
    /// The TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialled.
        addr: String,
        /// Underlying socket error.
        source: std::io::Error,
    },

    /// `connect` was called on a connection that already has a transport.
    #[error("already connected")]
    AlreadyConnected,

    /// The session was closed or already switched to data mode and can not
    /// run a new handshake.
    #[error("session closed; create a new connection")]
    Closed,

    /// An operation needed a transport but none is open.
    #[error("not connected")]
    NotConnected,

    /// TLS setup or handshake failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The gateway's first line was not a `HELLO` response.
    #[error("protocol error: unexpected greeting {0:?}")]
    UnexpectedGreeting(String),

    /// The gateway refused to switch to data mode.
    #[error("protocol error: could not create a data stream: {0}")]
    DataStreamRefused(String),

    /// The gateway rejected the password.
    #[error("could not authenticate: {0}")]
    Authentication(String),

    /// `authenticate` was called without a configured password.
    #[error("no password configured")]
    NoSecret,

    /// The operation is not allowed in the current mode.
    #[error("operation requires {expected} mode, connection is in {actual} mode")]
    WrongMode {
        /// Mode the operation needs.
        expected: Mode,
        /// Mode the connection is in.
        actual: Mode,
    },

    /// The gateway closed the connection.
    #[error("connection closed by peer")]
    Disconnected,

    /// Socket I/O error after the connection was established.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl VbusError {
    /// Whether the session can no longer be used after this error.
    ///
    /// Authentication failures and misuse leave the transport intact.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            VbusError::Authentication(_)
                | VbusError::NoSecret
                | VbusError::WrongMode { .. }
                | VbusError::AlreadyConnected
                | VbusError::NotConnected
                | VbusError::Config(_)
        )
    }
}

/// Result type alias for client operations.
pub type VbusResult<T> = Result<T, VbusError>;
