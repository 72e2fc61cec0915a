//! Connection configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vbus_protocol::{MessageMode, ScanMode, DEFAULT_PORT};

use crate::error::VbusResult;

/// Default number of bytes requested per data-mode read.
pub const DEFAULT_READ_SIZE: usize = 1024;

/// Legacy bit for hex-dump tracing.
pub const TRACE_HEXDUMP: u8 = 0b0001;
/// Legacy bit for command tracing.
pub const TRACE_COMMAND: u8 = 0b0010;
/// Legacy bit for protocol tracing.
pub const TRACE_PROTOCOL: u8 = 0b0100;

/// Independent diagnostic trace toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    /// Log every raw read and write as a hex dump.
    pub hexdump: bool,
    /// Log every command-mode line sent and received.
    pub command: bool,
    /// Log every dropped frame with the reason.
    pub protocol: bool,
}

impl TraceOptions {
    /// All toggles on.
    pub fn all() -> Self {
        TraceOptions {
            hexdump: true,
            command: true,
            protocol: true,
        }
    }

    /// Resolve a legacy bitmask (`0b001` hex-dump, `0b010` command,
    /// `0b100` protocol). Unknown bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        TraceOptions {
            hexdump: bits & TRACE_HEXDUMP != 0,
            command: bits & TRACE_COMMAND != 0,
            protocol: bits & TRACE_PROTOCOL != 0,
        }
    }
}

/// Configuration for a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Gateway host name or address.
    pub host: String,
    /// Gateway TCP port.
    pub port: u16,
    /// Password sent with `PASS`, if the gateway needs one.
    pub password: Option<String>,
    /// Wrap the socket in TLS.
    pub tls: bool,
    /// Diagnostic trace toggles.
    pub trace: TraceOptions,
    /// How response messages are parsed.
    pub message_mode: MessageMode,
    /// How data-mode reads are split into frames.
    pub scan_mode: ScanMode,
    /// Bytes requested per data-mode read.
    pub read_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            password: None,
            tls: false,
            trace: TraceOptions::default(),
            message_mode: MessageMode::default(),
            scan_mode: ScanMode::default(),
            read_size: DEFAULT_READ_SIZE,
        }
    }
}

impl ConnectionConfig {
    /// Create a configuration for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        ConnectionConfig {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the password. An empty password means none.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable or disable TLS.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Set the trace toggles.
    pub fn with_trace(mut self, trace: TraceOptions) -> Self {
        self.trace = trace;
        self
    }

    /// Set the response message mode.
    pub fn with_message_mode(mut self, mode: MessageMode) -> Self {
        self.message_mode = mode;
        self
    }

    /// Set the frame scan mode.
    pub fn with_scan_mode(mut self, mode: ScanMode) -> Self {
        self.scan_mode = mode;
        self
    }

    /// Set the data-mode read size.
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }

    /// The configured password, treating an empty string as absent.
    pub fn secret(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// `host:port` for dialling and log output.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse a YAML configuration. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> VbusResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> VbusResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
