//! Commands sent to the gateway in command mode.

use crate::codec::LineCodec;
use crate::constants::{CMD_DATA, CMD_PASS};

/// Commands the host can send while in command mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate with the gateway password.
    Pass {
        /// The password, sent verbatim.
        secret: String,
    },
    /// Switch the connection into binary data mode.
    Data,
}

impl Command {
    /// Render the command as a line, without terminator.
    pub fn to_line(&self) -> String {
        match self {
            Command::Pass { secret } => format!("{} {}", CMD_PASS, secret),
            Command::Data => CMD_DATA.to_string(),
        }
    }

    /// Render the command for trace output, with secrets masked.
    pub fn to_trace_line(&self) -> String {
        match self {
            Command::Pass { .. } => format!("{} ********", CMD_PASS),
            other => other.to_line(),
        }
    }

    /// Encode the command for transmission, including the CRLF terminator.
    pub fn encode(&self) -> Vec<u8> {
        LineCodec::encode_command(&self.to_line())
    }
}
