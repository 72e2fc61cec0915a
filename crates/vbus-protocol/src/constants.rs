//! Protocol constants
//!
//! Fixed values of the VBUS gateway line protocol and the binary frame layout.

// ============================================================================
// Line protocol
// ============================================================================

/// Default TCP port of a VBUS gateway.
pub const DEFAULT_PORT: u16 = 7053;

/// Line terminator appended to every command.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Response type the gateway greets new connections with.
pub const GREETING_TYPE: &str = "HELLO";

/// Command keyword for password authentication.
pub const CMD_PASS: &str = "PASS";
/// Command keyword that switches the connection into data mode.
pub const CMD_DATA: &str = "DATA";

// ============================================================================
// Binary frames
// ============================================================================

/// Byte that separates frames in the data stream.
pub const SENTINEL: u8 = 0xAA;

/// Protocol identifier every accepted frame must carry.
pub const PROTOCOL_ID: u8 = 0x10;

/// Command identifier of frames that carry a sensor payload.
pub const PAYLOAD_COMMAND: u16 = 0x0100;

/// Offset of the protocol identifier within a frame.
pub const OFFSET_PROTOCOL: usize = 4;
/// Offset of the little-endian command identifier.
pub const OFFSET_COMMAND: usize = 5;
/// Offset of the sub-frame count.
pub const OFFSET_FRAME_COUNT: usize = 7;
/// Offset of the header checksum.
pub const OFFSET_CHECKSUM: usize = 8;
/// Offset of the first payload byte.
pub const OFFSET_PAYLOAD: usize = 9;

/// Number of reserved address bytes at the start of a frame.
pub const RESERVED_LEN: usize = 4;

/// Header length, i.e. the bytes covered by the checksum.
pub const HEADER_LEN: usize = 8;

/// Payload bytes carried per sub-frame.
pub const BYTES_PER_FRAME: usize = 6;

/// Initial value of the checksum accumulator.
pub const CHECKSUM_SEED: u8 = 0x7F;

/// Mask keeping the checksum within 7 bits.
pub const CHECKSUM_MASK: u8 = 0x7F;

/// Longest frame a header can announce, excluding the sentinel.
pub const MAX_FRAME_LEN: usize = OFFSET_PAYLOAD + BYTES_PER_FRAME * u8::MAX as usize;
