//! Line-based codec for command mode.
//!
//! Command mode uses CRLF-terminated ASCII lines in both directions. The
//! codec accumulates received bytes until a `\n` is seen and hands back the
//! line with its trailing `\r`/`\n` stripped.

use bytes::{Buf, BytesMut};

use crate::constants::LINE_TERMINATOR;
use crate::error::{ProtocolError, ProtocolResult};

/// Maximum accepted response line length.
pub const MAX_LINE_LENGTH: usize = 512;

/// A codec for reading and writing command-mode lines.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(MAX_LINE_LENGTH),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode a complete line from the buffer.
    ///
    /// Returns `Ok(Some(line))` once a `\n` has been received, `Ok(None)` if
    /// more data is needed. The returned line may be empty.
    pub fn decode_line(&mut self) -> ProtocolResult<Option<String>> {
        match self.buffer.iter().position(|&b| b == b'\n') {
            Some(end) => {
                let line = self.buffer.split_to(end + 1);
                Ok(Some(Self::strip(&line)))
            }
            None if self.buffer.len() > MAX_LINE_LENGTH => {
                let actual = self.buffer.len();
                self.buffer.clear();
                Err(ProtocolError::LineTooLong {
                    max: MAX_LINE_LENGTH,
                    actual,
                })
            }
            None => Ok(None),
        }
    }

    /// Take whatever is buffered as a final, unterminated line.
    ///
    /// Used when the peer closes the stream mid-line.
    pub fn take_partial(&mut self) -> String {
        let rest = self.buffer.split();
        Self::strip(&rest)
    }

    /// Encode a command for transmission.
    ///
    /// Appends the CRLF terminator.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(cmd.len() + LINE_TERMINATOR.len());
        buf.extend_from_slice(cmd.as_bytes());
        buf.extend_from_slice(LINE_TERMINATOR);
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.advance(self.buffer.len());
    }

    fn strip(raw: &[u8]) -> String {
        let mut end = raw.len();
        while end > 0 && (raw[end - 1] == b'\r' || raw[end - 1] == b'\n') {
            end -= 1;
        }
        String::from_utf8_lossy(&raw[..end]).into_owned()
    }
}
