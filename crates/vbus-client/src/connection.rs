//! The gateway connection facade.

use tracing::{debug, trace, warn};
use vbus_protocol::{validate_candidates, Frame, FrameScanner, Reading};

use crate::config::ConnectionConfig;
use crate::error::{VbusError, VbusResult};
use crate::line::{self, LineProtocol};
use crate::mode::{Mode, ModeController};
use crate::transport::{Stream, TransportSession};

/// A session with one VBUS gateway.
///
/// Not synchronised: use it from one thread at a time.
#[derive(Debug)]
pub struct Connection {
    config: ConnectionConfig,
    transport: TransportSession,
    mode: ModeController,
    scanner: FrameScanner,
    /// Set by [`Connection::close`]; a closed session is never reopened.
    closed: bool,
}

impl Connection {
    /// Create an unconnected session.
    pub fn new(config: ConnectionConfig) -> Self {
        Connection {
            transport: TransportSession::new(config.trace.hexdump),
            mode: ModeController::new(),
            scanner: FrameScanner::new(config.scan_mode),
            closed: false,
            config,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    /// Whether a transport is open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Connect using the `tls` setting from the configuration.
    pub fn open(&mut self) -> VbusResult<()> {
        self.connect(self.config.tls)
    }

    /// Connect to the gateway and perform the handshake.
    ///
    /// Checks the `HELLO` greeting and, if a password is configured,
    /// authenticates. Fails with [`VbusError::Closed`] once the session has
    /// been closed or has entered data mode.
    pub fn connect(&mut self, use_tls: bool) -> VbusResult<()> {
        self.ensure_reusable()?;
        self.transport
            .connect(&self.config.host, self.config.port, use_tls)?;
        self.handshake()
    }

    /// Run the handshake over an already-open stream.
    pub fn attach(&mut self, stream: Box<dyn Stream>) -> VbusResult<()> {
        self.ensure_reusable()?;
        self.transport.attach(stream)?;
        self.handshake()
    }

    /// A new handshake would start in command mode, which a session that has
    /// already switched to data can not return to.
    fn ensure_reusable(&self) -> VbusResult<()> {
        if self.closed || self.mode() == Mode::Data {
            return Err(VbusError::Closed);
        }
        Ok(())
    }

    fn handshake(&mut self) -> VbusResult<()> {
        let greeting = line::expect_greeting(&mut self.line_protocol());
        if let Err(e) = greeting {
            warn!(addr = %self.config.address(), error = %e, "gateway handshake failed");
            self.transport.close();
            return Err(e);
        }
        debug!(addr = %self.config.address(), "gateway greeting received");

        if self.config.secret().is_some() {
            self.authenticate()?;
        }
        Ok(())
    }

    fn line_protocol(&mut self) -> LineProtocol<'_> {
        LineProtocol::new(
            &mut self.transport,
            self.config.message_mode,
            self.config.trace.command,
        )
    }

    /// Send the configured password.
    ///
    /// Only allowed in command mode. A rejected password leaves the session
    /// usable.
    pub fn authenticate(&mut self) -> VbusResult<()> {
        let secret = self.config.secret().ok_or(VbusError::NoSecret)?.to_string();
        self.mode.require(Mode::Command)?;
        if !self.transport.is_connected() {
            return Err(VbusError::NotConnected);
        }

        if let Err(e) = line::authenticate(&mut self.line_protocol(), &secret) {
            warn!(error = %e, "authentication failed");
            return Err(e);
        }
        debug!("authenticated");
        Ok(())
    }

    /// Switch to data mode. Does nothing if already there.
    pub fn enter_data_mode(&mut self) -> VbusResult<()> {
        if !self.transport.is_connected() {
            return Err(VbusError::NotConnected);
        }
        let mut line = LineProtocol::new(
            &mut self.transport,
            self.config.message_mode,
            self.config.trace.command,
        );
        if let Err(e) = self.mode.enter_data_mode(&mut line) {
            warn!(error = %e, "could not enter data mode");
            return Err(e);
        }
        Ok(())
    }

    /// Read once and return the frames that validated.
    ///
    /// Enters data mode first if needed. Dropped candidates are only traced.
    /// A closed stream is reported as [`VbusError::Disconnected`].
    pub fn frames(&mut self) -> VbusResult<Vec<Frame>> {
        self.enter_data_mode()?;

        let chunk = self.transport.receive_bytes(self.config.read_size)?;
        if chunk.is_empty() {
            return Err(VbusError::Disconnected);
        }

        let report = validate_candidates(self.scanner.feed(&chunk));
        for rejection in &report.rejections {
            if self.config.trace.protocol {
                debug!("dropped frame: {}", rejection);
            } else {
                trace!("dropped frame: {}", rejection);
            }
        }
        Ok(report.frames)
    }

    /// Read once and decode every frame that validated.
    ///
    /// May return an empty vector when the read held no complete valid frame.
    pub fn data(&mut self) -> VbusResult<Vec<Reading>> {
        Ok(self
            .frames()?
            .iter()
            .map(|frame| Reading::decode(frame.payload()))
            .collect())
    }

    /// Write raw bytes to the gateway.
    pub fn send_bytes(&mut self, raw: &[u8]) -> VbusResult<()> {
        self.transport.send_bytes(raw)
    }

    /// Close the transport. The session can not be connected again; create
    /// a new [`Connection`] instead.
    pub fn close(&mut self) {
        self.transport.close();
        self.scanner.reset();
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraceOptions;
    use crate::test_support::{written_text, ScriptedStream, Written};
    use vbus_protocol::{PayloadField, ScanMode, SENTINEL};

    fn frame_bytes(temp1: u16, pump1: u8) -> Vec<u8> {
        let mut payload = vec![0u8; 30];
        payload[0..2].copy_from_slice(&temp1.to_le_bytes());
        payload[8] = pump1;
        Frame::new([0x10, 0x00, 0x11, 0x7E], payload).unwrap().encode()
    }

    fn attached(config: ConnectionConfig, script: &[u8]) -> (VbusResult<()>, Connection, Written) {
        let (stream, output) = ScriptedStream::new(script);
        let mut conn = Connection::new(config);
        let result = conn.attach(Box::new(stream));
        (result, conn, output)
    }

    #[test]
    fn test_handshake_without_password() {
        let (result, conn, output) = attached(ConnectionConfig::new("gw"), b"+HELLO\r\n");
        result.unwrap();
        assert!(conn.is_connected());
        assert_eq!(conn.mode(), Mode::Command);
        assert_eq!(written_text(&output), "");
    }

    #[test]
    fn test_handshake_authenticates() {
        let config = ConnectionConfig::new("gw").with_password("secret");
        let (result, _, output) = attached(config, b"+HELLO\r\n+PASS:ok\r\n");
        result.unwrap();
        assert_eq!(written_text(&output), "PASS secret\r\n");
    }

    #[test]
    fn test_bad_greeting_closes_transport() {
        let (result, conn, _) = attached(ConnectionConfig::new("gw"), b"+BYE\r\n");
        assert!(matches!(result, Err(VbusError::UnexpectedGreeting(_))));
        assert!(!conn.is_connected());
    }

    #[test]
    fn test_rejected_password_keeps_session() {
        let config = ConnectionConfig::new("gw").with_password("nope");
        let (result, conn, _) = attached(config, b"+HELLO\r\n-ERROR:Password rejected\r\n");
        assert!(matches!(result, Err(VbusError::Authentication(_))));
        assert!(conn.is_connected());
    }

    #[test]
    fn test_authenticate_needs_secret() {
        let (result, mut conn, _) = attached(ConnectionConfig::new("gw"), b"+HELLO\r\n");
        result.unwrap();
        assert!(matches!(conn.authenticate(), Err(VbusError::NoSecret)));
    }

    #[test]
    fn test_authenticate_refused_in_data_mode() {
        let config = ConnectionConfig::new("gw").with_password("secret");
        let mut script = b"+HELLO\r\n+OK\r\n+OK:Data\r\n".to_vec();
        script.extend(frame_bytes(1, 1));
        let (result, mut conn, output) = attached(config, &script);
        result.unwrap();

        conn.enter_data_mode().unwrap();
        assert!(matches!(
            conn.authenticate(),
            Err(VbusError::WrongMode {
                expected: Mode::Command,
                actual: Mode::Data
            })
        ));
        assert_eq!(written_text(&output), "PASS secret\r\nDATA\r\n");
    }

    #[test]
    fn test_data_decodes_frames() {
        let mut script = b"+HELLO\r\n+OK:Data\r\n".to_vec();
        script.extend(frame_bytes(215, 100));
        script.extend(frame_bytes(220, 0));
        script.push(SENTINEL);
        let config = ConnectionConfig::new("gw").with_trace(TraceOptions::all());
        let (result, mut conn, output) = attached(config, &script);
        result.unwrap();

        let readings = conn.data().unwrap();
        assert_eq!(conn.mode(), Mode::Data);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].get(PayloadField::Temp1), Some(215));
        assert_eq!(readings[0].get(PayloadField::Pump1), Some(100));
        assert_eq!(readings[1].get(PayloadField::Temp1), Some(220));
        assert_eq!(readings[1].get(PayloadField::Version), Some(0));

        // DATA is only sent once
        assert!(matches!(conn.data(), Err(VbusError::Disconnected)));
        assert_eq!(written_text(&output), "DATA\r\n");
    }

    #[test]
    fn test_data_drops_corrupt_frames() {
        let mut script = b"+HELLO\r\n+OK\r\n".to_vec();
        let mut bad = frame_bytes(1, 1);
        bad[9] ^= 0x01; // checksum
        script.extend(bad);
        script.extend(frame_bytes(2, 2));
        let config = ConnectionConfig::new("gw").with_scan_mode(ScanMode::SingleRead);
        let (result, mut conn, _) = attached(config, &script);
        result.unwrap();

        let readings = conn.data().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].get(PayloadField::Temp1), Some(2));
    }

    #[test]
    fn test_data_refused() {
        let (result, mut conn, _) = attached(ConnectionConfig::new("gw"), b"+HELLO\r\n-ERROR:busy\r\n");
        result.unwrap();
        assert!(matches!(conn.data(), Err(VbusError::DataStreamRefused(_))));
        assert_eq!(conn.mode(), Mode::Command);
    }

    #[test]
    fn test_closed_session_refuses_reconnect() {
        let (result, mut conn, _) = attached(ConnectionConfig::new("gw"), b"+HELLO\r\n+OK\r\n");
        result.unwrap();
        conn.enter_data_mode().unwrap();
        conn.close();

        let (stream, output) = ScriptedStream::new(b"+HELLO\r\n");
        assert!(matches!(conn.attach(Box::new(stream)), Err(VbusError::Closed)));
        assert!(matches!(conn.connect(false), Err(VbusError::Closed)));
        assert!(!conn.is_connected());
        assert_eq!(written_text(&output), "");
    }

    #[test]
    fn test_closed_in_command_mode_refuses_reconnect() {
        let (result, mut conn, _) = attached(ConnectionConfig::new("gw"), b"+HELLO\r\n");
        result.unwrap();
        conn.close();
        assert_eq!(conn.mode(), Mode::Command);

        let (stream, _) = ScriptedStream::new(b"+HELLO\r\n");
        assert!(matches!(conn.attach(Box::new(stream)), Err(VbusError::Closed)));
    }

    #[test]
    fn test_retry_after_bad_greeting() {
        let (result, mut conn, _) = attached(ConnectionConfig::new("gw"), b"+BYE\r\n");
        assert!(matches!(result, Err(VbusError::UnexpectedGreeting(_))));

        let (stream, _) = ScriptedStream::new(b"+HELLO\r\n");
        conn.attach(Box::new(stream)).unwrap();
        assert!(conn.is_connected());
    }

    #[test]
    fn test_not_connected() {
        let mut conn = Connection::new(ConnectionConfig::new("gw").with_password("x"));
        assert!(matches!(conn.enter_data_mode(), Err(VbusError::NotConnected)));
        assert!(matches!(conn.authenticate(), Err(VbusError::NotConnected)));
        assert!(matches!(conn.data(), Err(VbusError::NotConnected)));
    }
}
