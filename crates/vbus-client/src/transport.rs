//! Blocking byte transport.
//!
//! Wraps a TCP (or TLS) stream with the small set of operations the protocol
//! needs: line send/receive for command mode and raw reads/writes for data
//! mode. Every call blocks until the socket operation completes.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

use tracing::debug;
use vbus_protocol::hexdump::hexdump;
use vbus_protocol::LineCodec;

use crate::error::{VbusError, VbusResult};

/// Any bidirectional byte stream a session can run over.
pub trait Stream: Read + Write + Send {}

impl<T: Read + Write + Send> Stream for T {}

/// A single gateway transport.
pub struct TransportSession {
    stream: Option<Box<dyn Stream>>,
    codec: LineCodec,
    hexdump: bool,
}

impl std::fmt::Debug for TransportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSession")
            .field("connected", &self.stream.is_some())
            .field("hexdump", &self.hexdump)
            .finish()
    }
}

impl TransportSession {
    /// Create an unconnected transport. `hexdump` traces all raw traffic.
    pub fn new(hexdump: bool) -> Self {
        TransportSession {
            stream: None,
            codec: LineCodec::new(),
            hexdump,
        }
    }

    /// Whether a stream is open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open a TCP connection to `host:port`, optionally wrapped in TLS.
    pub fn connect(&mut self, host: &str, port: u16, use_tls: bool) -> VbusResult<()> {
        if self.stream.is_some() {
            return Err(VbusError::AlreadyConnected);
        }

        let addr = format!("{}:{}", host, port);
        let tcp = TcpStream::connect(&addr).map_err(|source| VbusError::Connect {
            addr: addr.clone(),
            source,
        })?;
        tcp.set_nodelay(true)?;

        let stream: Box<dyn Stream> = if use_tls {
            wrap_tls(host, tcp)?
        } else {
            Box::new(tcp)
        };

        debug!(addr = %addr, tls = use_tls, "transport connected");
        self.stream = Some(stream);
        Ok(())
    }

    /// Use an already-open stream.
    pub fn attach(&mut self, stream: Box<dyn Stream>) -> VbusResult<()> {
        if self.stream.is_some() {
            return Err(VbusError::AlreadyConnected);
        }
        self.stream = Some(stream);
        Ok(())
    }

    /// Drop the stream.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!("transport closed");
        }
        self.codec.clear();
    }

    fn stream(&mut self) -> VbusResult<&mut Box<dyn Stream>> {
        self.stream.as_mut().ok_or(VbusError::NotConnected)
    }

    /// Send `line` followed by CRLF.
    pub fn send_line(&mut self, line: &str) -> VbusResult<()> {
        self.write_raw(&LineCodec::encode_command(line))
    }

    /// Read one line, without its terminator.
    ///
    /// Reads a byte at a time so nothing past the newline is consumed; the
    /// gateway may start streaming binary data right after a response.
    /// Returns an empty string if the peer closed the stream.
    pub fn receive_line(&mut self) -> VbusResult<String> {
        let mut byte = [0u8; 1];
        loop {
            let n = match self.stream()?.read(&mut byte) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                return Ok(self.codec.take_partial());
            }
            self.codec.push(&byte);
            if let Some(line) = self.codec.decode_line()? {
                return Ok(line);
            }
        }
    }

    /// One blocking read of up to `n` bytes.
    ///
    /// May return fewer bytes than asked for, and an empty vector when the
    /// peer closed the stream. No frame alignment is implied.
    pub fn receive_bytes(&mut self, n: usize) -> VbusResult<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let read = loop {
            match self.stream()?.read(&mut buf) {
                Ok(read) => break read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        buf.truncate(read);
        if self.hexdump {
            debug!("recv {}", hexdump(&buf));
        }
        Ok(buf)
    }

    /// Write `raw` unmodified.
    pub fn send_bytes(&mut self, raw: &[u8]) -> VbusResult<()> {
        if self.hexdump {
            debug!("send {}", hexdump(raw));
        }
        self.write_raw(raw)
    }

    fn write_raw(&mut self, raw: &[u8]) -> VbusResult<()> {
        let stream = self.stream()?;
        stream.write_all(raw)?;
        stream.flush()?;
        Ok(())
    }
}

#[cfg(feature = "tls")]
fn wrap_tls(host: &str, tcp: TcpStream) -> VbusResult<Box<dyn Stream>> {
    let connector = native_tls::TlsConnector::new().map_err(|e| VbusError::Tls(e.to_string()))?;
    let stream = connector
        .connect(host, tcp)
        .map_err(|e| VbusError::Tls(e.to_string()))?;
    Ok(Box::new(stream))
}

#[cfg(not(feature = "tls"))]
fn wrap_tls(_host: &str, _tcp: TcpStream) -> VbusResult<Box<dyn Stream>> {
    Err(VbusError::Tls(
        "TLS requested but the `tls` feature is not enabled".to_string(),
    ))
}
