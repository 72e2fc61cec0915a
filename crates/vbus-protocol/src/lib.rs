//! VBUS-over-TCP Protocol
//!
//! This crate provides types and utilities for talking to a VBUS gateway, the
//! TCP service that tunnels a solar controller's bus onto the network. It is
//! free of I/O: callers feed it lines and byte chunks and get back parsed
//! responses, validated frames and decoded sensor readings.
//!
//! # Protocol Overview
//!
//! A session starts in **command mode**, a line-based text protocol:
//!
//! - **Commands** (host → gateway): `PASS <secret>`, `DATA`, terminated with `\r\n`
//! - **Responses** (gateway → host): `+TYPE`, `+TYPE:MESSAGE` or `-TYPE:MESSAGE`
//! - **Greeting**: the gateway opens with a positive `HELLO` response
//!
//! After a successful `DATA` command the session is in **data mode** and the
//! gateway streams binary frames delimited by the sentinel byte `0xAA`:
//!
//! ```text
//! AA | reserved[4] | proto | cmd_lo | cmd_hi | frames | checksum | payload[6 * frames]
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use vbus_protocol::{FrameScanner, FrameValidator, Reading, ScanMode};
//!
//! let mut scanner = FrameScanner::new(ScanMode::Buffered);
//! for candidate in scanner.feed(&chunk) {
//!     if let Ok(frame) = FrameValidator::validate(&candidate) {
//!         let reading = Reading::decode(frame.payload());
//!     }
//! }
//! ```

mod checksum;
mod codec;
mod commands;
mod constants;
mod error;
mod frame;
pub mod hexdump;
mod payload;
mod responses;
mod scanner;

pub use checksum::*;
pub use codec::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use payload::*;
pub use responses::*;
pub use scanner::*;
