//! Command-mode line exchange: greeting, authentication and commands.

use tracing::debug;
use vbus_protocol::{Command, MessageMode, Response, GREETING_TYPE};

use crate::error::{VbusError, VbusResult};
use crate::transport::TransportSession;

/// Something that can send a command line and read back one response.
pub trait LineExchange {
    /// Send a command line.
    fn send_command(&mut self, command: &Command) -> VbusResult<()>;

    /// Read and parse one response line.
    fn receive_response(&mut self) -> VbusResult<Response>;

    /// Send a command and read its response.
    fn exchange(&mut self, command: &Command) -> VbusResult<Response> {
        self.send_command(command)?;
        self.receive_response()
    }
}

/// Line protocol over a [`TransportSession`].
#[derive(Debug)]
pub struct LineProtocol<'a> {
    transport: &'a mut TransportSession,
    message_mode: MessageMode,
    trace: bool,
}

impl<'a> LineProtocol<'a> {
    /// Borrow `transport` for a command-mode exchange.
    ///
    /// `trace` logs every line sent and received.
    pub fn new(transport: &'a mut TransportSession, message_mode: MessageMode, trace: bool) -> Self {
        LineProtocol {
            transport,
            message_mode,
            trace,
        }
    }
}

impl LineExchange for LineProtocol<'_> {
    fn send_command(&mut self, command: &Command) -> VbusResult<()> {
        if self.trace {
            debug!("> {}", command.to_trace_line());
        }
        self.transport.send_line(&command.to_line())
    }

    fn receive_response(&mut self) -> VbusResult<Response> {
        let line = self.transport.receive_line()?;
        if self.trace {
            debug!("< {}", line);
        }
        if line.is_empty() {
            return Err(VbusError::Disconnected);
        }
        Ok(Response::parse_with(&line, self.message_mode)?)
    }
}

/// Read the gateway greeting and check it is a positive `HELLO` response.
pub fn expect_greeting<L: LineExchange + ?Sized>(line: &mut L) -> VbusResult<Response> {
    let greeting = match line.receive_response() {
        Ok(resp) => resp,
        Err(VbusError::Protocol(e)) => return Err(VbusError::UnexpectedGreeting(e.to_string())),
        Err(e) => return Err(e),
    };
    if !greeting.positive || !greeting.is(GREETING_TYPE) {
        return Err(VbusError::UnexpectedGreeting(greeting.kind));
    }
    Ok(greeting)
}

/// Send `PASS <secret>` and check the gateway accepted it.
pub fn authenticate<L: LineExchange + ?Sized>(line: &mut L, secret: &str) -> VbusResult<()> {
    let resp = line.exchange(&Command::Pass {
        secret: secret.to_string(),
    })?;
    if !resp.positive {
        return Err(VbusError::Authentication(resp.message_or_empty().to_string()));
    }
    Ok(())
}
