//! Binary frame validation and construction.
//!
//! A candidate is the byte run between two sentinels, without the sentinel
//! itself:
//!
//! ```text
//! +------------+-------+--------+--------+----------+----------------------+
//! | reserved 4 | proto | cmd_le (2)      | frames   | checksum | payload    |
//! +------------+-------+--------+--------+----------+----------------------+
//!   0..4         4       5..7              7          8          9..9+6*frames
//! ```

use bytes::Bytes;
use thiserror::Error;

use crate::checksum::checksum;
use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};

/// Why a candidate frame was dropped.
///
/// Rejections are expected line noise, not faults: the caller may trace them
/// but should keep reading.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fewer bytes than a full header plus checksum.
    #[error("frame too short: {0} bytes")]
    TooShort(usize),

    /// Protocol byte is not `0x10`.
    #[error("unexpected protocol 0x{0:02X}")]
    ProtocolMismatch(u8),

    /// Command is not the payload command `0x0100`.
    #[error("unexpected command 0x{0:04X}")]
    CommandMismatch(u16),

    /// Header checksum does not match.
    #[error("invalid checksum: got {actual:02X} expected {expected:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the header.
        actual: u8,
        /// Checksum byte carried by the frame.
        expected: u8,
    },

    /// Payload is not exactly `6 * frames` bytes.
    #[error("unexpected payload length: {actual} != {expected}")]
    LengthMismatch {
        /// Bytes present after the checksum.
        actual: usize,
        /// Bytes announced by the frame count.
        expected: usize,
    },
}

/// A validated payload frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    reserved: [u8; RESERVED_LEN],
    frame_count: u8,
    payload: Bytes,
}

impl Frame {
    /// Build a payload frame around `payload`.
    ///
    /// `payload` must be a whole number of 6-byte sub-frames, and no byte of
    /// the encoded frame after the leading sentinel may equal [`SENTINEL`].
    pub fn new(reserved: [u8; RESERVED_LEN], payload: impl Into<Bytes>) -> ProtocolResult<Frame> {
        let payload = payload.into();
        if payload.len() % BYTES_PER_FRAME != 0 {
            return Err(ProtocolError::UnalignedPayload(payload.len()));
        }
        let frame_count = u8::try_from(payload.len() / BYTES_PER_FRAME)
            .map_err(|_| ProtocolError::PayloadTooLong(payload.len()))?;
        let frame = Frame {
            reserved,
            frame_count,
            payload,
        };
        // offsets are relative to the candidate, i.e. after the sentinel
        if let Some(pos) = frame.header().iter().position(|&b| b == SENTINEL) {
            return Err(ProtocolError::SentinelInFrame(pos));
        }
        if let Some(pos) = frame.payload.iter().position(|&b| b == SENTINEL) {
            return Err(ProtocolError::SentinelInFrame(OFFSET_PAYLOAD + pos));
        }
        Ok(frame)
    }

    /// The four reserved address bytes.
    pub fn reserved(&self) -> [u8; RESERVED_LEN] {
        self.reserved
    }

    /// Number of 6-byte sub-frames in the payload.
    pub fn frame_count(&self) -> u8 {
        self.frame_count
    }

    /// The payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The 8 header bytes covered by the checksum.
    pub fn header(&self) -> [u8; HEADER_LEN] {
        let [c0, c1] = PAYLOAD_COMMAND.to_le_bytes();
        let r = self.reserved;
        [r[0], r[1], r[2], r[3], PROTOCOL_ID, c0, c1, self.frame_count]
    }

    /// The header checksum.
    pub fn checksum(&self) -> u8 {
        checksum(&self.header())
    }

    /// Encode the frame for the wire, prefixed with the sentinel byte.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + OFFSET_PAYLOAD + self.payload.len());
        buf.push(SENTINEL);
        buf.extend_from_slice(&self.header());
        buf.push(self.checksum());
        buf.extend_from_slice(&self.payload);
        buf
    }
}

/// Validates sentinel-delimited candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameValidator;

impl FrameValidator {
    /// Check a candidate and extract its payload.
    ///
    /// Checks run in order: length, protocol, command, checksum, payload
    /// length. The first failure is returned.
    pub fn validate(candidate: &[u8]) -> Result<Frame, Rejection> {
        if candidate.len() < OFFSET_PAYLOAD {
            return Err(Rejection::TooShort(candidate.len()));
        }

        let protocol = candidate[OFFSET_PROTOCOL];
        if protocol != PROTOCOL_ID {
            return Err(Rejection::ProtocolMismatch(protocol));
        }

        let command = u16::from_le_bytes([candidate[OFFSET_COMMAND], candidate[OFFSET_COMMAND + 1]]);
        if command != PAYLOAD_COMMAND {
            return Err(Rejection::CommandMismatch(command));
        }

        let actual = checksum(&candidate[..HEADER_LEN]);
        let expected = candidate[OFFSET_CHECKSUM];
        if actual != expected {
            return Err(Rejection::ChecksumMismatch { actual, expected });
        }

        let frame_count = candidate[OFFSET_FRAME_COUNT];
        let expected = BYTES_PER_FRAME * frame_count as usize;
        let payload = &candidate[OFFSET_PAYLOAD..];
        if payload.len() != expected {
            return Err(Rejection::LengthMismatch {
                actual: payload.len(),
                expected,
            });
        }

        let mut reserved = [0u8; RESERVED_LEN];
        reserved.copy_from_slice(&candidate[..RESERVED_LEN]);

        Ok(Frame {
            reserved,
            frame_count,
            payload: Bytes::copy_from_slice(payload),
        })
    }
}
