//! 7-bit subtractive checksum used in frame headers.

use crate::constants::{CHECKSUM_MASK, CHECKSUM_SEED};

/// Compute the VBUS header checksum of `data`.
///
/// Starts at `0x7F`, subtracts every byte modulo 256 and keeps the low seven
/// bits after each step. The result is always in `0..=127`.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter()
        .fold(CHECKSUM_SEED, |acc, &b| acc.wrapping_sub(b) & CHECKSUM_MASK)
}
