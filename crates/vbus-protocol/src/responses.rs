//! Response parsing for command mode.
//!
//! Every gateway reply is a single line of the form:
//! - `+TYPE` - success without message
//! - `+TYPE:MESSAGE` - success with message
//! - `-TYPE:MESSAGE` - failure

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// How much of the message portion of a response line is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageMode {
    /// Keep everything after the first `:`.
    #[default]
    Full,
    /// Keep only the first character after the first `:`.
    ///
    /// Reproduces the truncation of older clients.
    FirstChar,
}

/// A parsed gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// `true` for `+` lines, `false` for `-` lines.
    pub positive: bool,
    /// The response type, e.g. `HELLO`, `OK`, `ERROR`.
    pub kind: String,
    /// The message portion, if the line had one.
    pub message: Option<String>,
}

impl Response {
    /// Parse a response line keeping the full message.
    pub fn parse(line: &str) -> ProtocolResult<Response> {
        Self::parse_with(line, MessageMode::Full)
    }

    /// Parse a response line with an explicit message mode.
    pub fn parse_with(line: &str, mode: MessageMode) -> ProtocolResult<Response> {
        let positive = match line.as_bytes().first() {
            Some(b'+') => true,
            Some(b'-') => false,
            _ => return Err(ProtocolError::MalformedResponse(line.to_string())),
        };

        let body = &line[1..];
        let (kind, message) = match body.split_once(':') {
            Some((kind, message)) => (kind, Some(message)),
            None => (body, None),
        };

        if kind.is_empty() {
            return Err(ProtocolError::MalformedResponse(line.to_string()));
        }

        let message = message.map(|m| match mode {
            MessageMode::Full => m.to_string(),
            MessageMode::FirstChar => m.chars().take(1).collect(),
        });

        Ok(Response {
            positive,
            kind: kind.to_string(),
            message,
        })
    }

    /// Check whether this response has the given type.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// The message, or an empty string when absent.
    pub fn message_or_empty(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}
