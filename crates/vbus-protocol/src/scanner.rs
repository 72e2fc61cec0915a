//! Sentinel-based frame scanning.
//!
//! The data stream is a sequence of frames separated by [`SENTINEL`] bytes.
//! Reads from the socket are not aligned to frames, so the scanner either
//! splits each read on its own ([`ScanMode::SingleRead`]) or keeps a buffer
//! across reads and only releases a segment once the sentinel that closes it
//! has arrived ([`ScanMode::Buffered`]). In buffered mode the last frame of a
//! read is therefore held back until the next frame starts.

use bytes::{Buf, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::frame::{Frame, FrameValidator, Rejection};

/// How reads are turned into candidate frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Carry partial frames over to the next read.
    #[default]
    Buffered,
    /// Split every read independently; frames spanning two reads are lost.
    SingleRead,
}

/// Splits raw data-mode bytes into candidate frames.
#[derive(Debug)]
pub struct FrameScanner {
    mode: ScanMode,
    /// Bytes following the most recent sentinel (buffered mode only).
    buffer: BytesMut,
    /// Whether `buffer` starts right after a sentinel.
    synced: bool,
    /// Bytes dropped because they could not belong to a frame.
    discarded: usize,
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new(ScanMode::default())
    }
}

impl FrameScanner {
    /// Create a new scanner.
    pub fn new(mode: ScanMode) -> Self {
        FrameScanner {
            mode,
            buffer: BytesMut::with_capacity(MAX_FRAME_LEN),
            synced: false,
            discarded: 0,
        }
    }

    /// The scan mode.
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Feed one read and return the candidates it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        match self.mode {
            ScanMode::SingleRead => split_chunk(chunk),
            ScanMode::Buffered => self.feed_buffered(chunk),
        }
    }

    fn feed_buffered(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(chunk);
        let mut candidates = Vec::new();

        loop {
            let end = self.buffer.iter().position(|&b| b == SENTINEL);
            let segment_len = end.unwrap_or(self.buffer.len());

            // Longer than any header can announce: cut at a fixed length so
            // the result does not depend on where reads were split.
            if self.synced && segment_len >= OVERSIZED_SEGMENT {
                candidates.push(self.buffer.split_to(OVERSIZED_SEGMENT).freeze());
                self.synced = false;
                continue;
            }

            match end {
                Some(pos) => {
                    let segment = self.buffer.split_to(pos).freeze();
                    self.buffer.advance(1);
                    if self.synced {
                        candidates.push(segment);
                    } else {
                        self.discarded += segment.len();
                    }
                    self.synced = true;
                }
                None => {
                    if !self.synced {
                        self.discarded += self.buffer.len();
                        self.buffer.clear();
                    }
                    break;
                }
            }
        }

        candidates
    }

    /// Number of bytes currently held back waiting for more data.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes dropped as unsynchronised noise.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Drop any buffered bytes and wait for the next sentinel.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.synced = false;
    }
}

/// Split one chunk on the sentinel byte. Every piece is a candidate,
/// including the bytes before the first sentinel.
pub fn split_chunk(chunk: &[u8]) -> Vec<Bytes> {
    chunk
        .split(|&b| b == SENTINEL)
        .map(Bytes::copy_from_slice)
        .collect()
}

/// Length at which a segment is released without waiting for its sentinel.
/// Always one byte more than any valid frame, so it is always rejected.
const OVERSIZED_SEGMENT: usize = MAX_FRAME_LEN + 1;

/// Frames and rejections found in one chunk.
#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    /// Candidates that passed validation, in stream order.
    pub frames: Vec<Frame>,
    /// Reasons for every dropped candidate, in stream order.
    pub rejections: Vec<Rejection>,
}

/// Validate a batch of candidates.
pub fn validate_candidates<I>(candidates: I) -> ScanReport
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut report = ScanReport::default();
    for candidate in candidates {
        match FrameValidator::validate(candidate.as_ref()) {
            Ok(frame) => report.frames.push(frame),
            Err(rejection) => report.rejections.push(rejection),
        }
    }
    report
}

/// Split and validate a single chunk with no carried state.
pub fn validate_all(chunk: &[u8]) -> ScanReport {
    validate_candidates(split_chunk(chunk))
}
