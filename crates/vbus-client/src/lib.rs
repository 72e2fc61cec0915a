//! VBUS Gateway Client
//!
//! A blocking client for VBUS gateways, the TCP services that expose a solar
//! controller's bus. A [`Connection`] walks the session through its lifecycle:
//!
//! 1. Connect over TCP (optionally TLS) and check the `HELLO` greeting
//! 2. Optionally authenticate with `PASS <secret>`
//! 3. Switch to data mode with `DATA`
//! 4. Read binary frames and decode them into [`Reading`]s
//!
//! Malformed frames are dropped silently (traced when protocol tracing is on);
//! handshake failures surface as [`VbusError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use vbus_client::{Connection, ConnectionConfig, PayloadField};
//!
//! # fn main() -> vbus_client::VbusResult<()> {
//! let config = ConnectionConfig::new("192.168.13.45").with_password("vbus");
//! let mut conn = Connection::new(config);
//! conn.connect(false)?;
//!
//! loop {
//!     for reading in conn.data()? {
//!         println!("collector: {:?}", reading.get(PayloadField::Temp1));
//!     }
//! }
//! # }
//! ```

mod config;
mod connection;
mod error;
mod line;
mod mode;
mod transport;

#[cfg(test)]
mod test_support;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use line::*;
pub use mode::*;
pub use transport::*;

pub use vbus_protocol::{
    Frame, MessageMode, PayloadField, Reading, Rejection, Response, ScanMode, SENTINEL,
};
