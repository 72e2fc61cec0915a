//! Command/Data mode state machine.
//!
//! A session starts in [`Mode::Command`] and moves to [`Mode::Data`] once the
//! gateway accepts `DATA`. There is no way back: a data-mode session stays in
//! data mode until it is closed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vbus_protocol::Command;

use crate::error::{VbusError, VbusResult};
use crate::line::LineExchange;

/// Operating mode of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Line-based command/response exchange.
    #[default]
    Command,
    /// Binary frame streaming.
    Data,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Command => write!(f, "command"),
            Mode::Data => write!(f, "data"),
        }
    }
}

/// Owns the session mode. The only way to change it is
/// [`ModeController::enter_data_mode`].
#[derive(Debug, Default)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    /// Create a controller in command mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Fail with [`VbusError::WrongMode`] unless in `expected` mode.
    pub fn require(&self, expected: Mode) -> VbusResult<()> {
        if self.mode != expected {
            return Err(VbusError::WrongMode {
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }

    /// Switch to data mode by sending `DATA`.
    ///
    /// Does nothing if already in data mode. Returns whether a transition
    /// happened.
    pub fn enter_data_mode<L: LineExchange + ?Sized>(&mut self, line: &mut L) -> VbusResult<bool> {
        if self.mode == Mode::Data {
            return Ok(false);
        }

        let resp = line.exchange(&Command::Data)?;
        if !resp.positive {
            return Err(VbusError::DataStreamRefused(resp.message_or_empty().to_string()));
        }

        self.mode = Mode::Data;
        debug!("entered data mode");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbus_protocol::Response;

    /// Replies to every command with a canned response line.
    struct CannedExchange {
        reply: &'static str,
        sent: Vec<Command>,
    }

    impl CannedExchange {
        fn new(reply: &'static str) -> Self {
            CannedExchange {
                reply,
                sent: Vec::new(),
            }
        }
    }

    impl LineExchange for CannedExchange {
        fn send_command(&mut self, command: &Command) -> VbusResult<()> {
            self.sent.push(command.clone());
            Ok(())
        }

        fn receive_response(&mut self) -> VbusResult<Response> {
            Ok(Response::parse(self.reply)?)
        }
    }

    #[test]
    fn test_starts_in_command_mode() {
        let controller = ModeController::new();
        assert_eq!(controller.mode(), Mode::Command);
        assert!(controller.require(Mode::Command).is_ok());
        assert!(matches!(
            controller.require(Mode::Data),
            Err(VbusError::WrongMode {
                expected: Mode::Data,
                actual: Mode::Command
            })
        ));
    }

    #[test]
    fn test_enter_data_mode_is_idempotent() {
        let mut controller = ModeController::new();
        let mut line = CannedExchange::new("+OK");

        assert!(controller.enter_data_mode(&mut line).unwrap());
        assert!(!controller.enter_data_mode(&mut line).unwrap());

        assert_eq!(line.sent, vec![Command::Data]);
        assert_eq!(controller.mode(), Mode::Data);
    }

    #[test]
    fn test_refused_stays_in_command_mode() {
        let mut controller = ModeController::new();
        let mut line = CannedExchange::new("-ERROR:Not authorized");

        let err = controller.enter_data_mode(&mut line).unwrap_err();
        assert!(matches!(err, VbusError::DataStreamRefused(ref m) if m == "Not authorized"));
        assert!(err.is_fatal());
        assert_eq!(controller.mode(), Mode::Command);
    }

    #[test]
    fn test_display() {
        assert_eq!(Mode::Command.to_string(), "command");
        assert_eq!(Mode::Data.to_string(), "data");
    }
}
