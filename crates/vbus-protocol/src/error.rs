//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the VBUS protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A line could not be parsed as a `+TYPE[:MESSAGE]` / `-TYPE:MESSAGE` response.
    #[error("malformed response line: {0:?}")]
    MalformedResponse(String),

    /// A line exceeded the maximum accepted length.
    #[error("line too long: maximum {max} bytes, got {actual}")]
    LineTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length received.
        actual: usize,
    },

    /// A frame payload was not a whole number of sub-frames.
    #[error("payload length {0} is not a multiple of 6")]
    UnalignedPayload(usize),

    /// A frame payload needed more sub-frames than the count byte can hold.
    #[error("payload of {0} bytes exceeds 255 sub-frames")]
    PayloadTooLong(usize),

    /// The sentinel byte appeared inside the frame (reserved bytes, frame
    /// count or payload), which would split it on the wire.
    #[error("frame contains the sentinel byte 0xAA at offset {0}")]
    SentinelInFrame(usize),
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
