//! Wire constants and the validated live-data frame

/// First sync byte.
pub const SYNC_1: u8 = 0xB5;
/// Second sync byte.
pub const SYNC_2: u8 = 0x62;
/// Number of sync bytes skipped when a candidate is rejected.
pub const SYNC_LEN: usize = 2;

/// Message class of the live-data message.
pub const LIVE_DATA_CLASS: u8 = 0xFF;
/// Message id of the live-data message.
pub const LIVE_DATA_ID: u8 = 0x01;
/// Payload length of the live-data message.
pub const LIVE_DATA_PAYLOAD_LEN: usize = 80;

pub(crate) const CLASS_OFFSET: usize = 2;
pub(crate) const ID_OFFSET: usize = 3;
pub(crate) const LENGTH_OFFSET: usize = 4;
/// Payload starts right after sync, class, id and length.
pub const PAYLOAD_OFFSET: usize = 6;

/// Bytes that must be buffered before class and id are inspected.
pub const HEADER_LEN: usize = 8;
/// Trailer bytes following the payload. Never validated.
pub const TRAILER_LEN: usize = 2;

/// Total bytes the scanner waits for and consumes for a given payload length.
pub const fn frame_len(payload_len: usize) -> usize {
    HEADER_LEN + payload_len + TRAILER_LEN
}

/// Wire length of a live-data frame as consumed by the scanner (90 bytes).
pub const LIVE_DATA_FRAME_LEN: usize = frame_len(LIVE_DATA_PAYLOAD_LEN);

/// A header-valid frame sliced out of the accumulator.
///
/// Borrowed from the accumulator for the duration of one decode; frames never
/// outlive the scan iteration that produced them.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    bytes: &'a [u8],
    payload_len: usize,
}

impl<'a> Frame<'a> {
    /// Wrap a candidate whose sync, class and id have already been matched.
    ///
    /// `bytes` must hold [`frame_len`]`(payload_len)` bytes.
    pub(crate) fn new(bytes: &'a [u8], payload_len: usize) -> Self {
        Self { bytes, payload_len }
    }

    pub fn class(&self) -> u8 {
        self.bytes[CLASS_OFFSET]
    }

    pub fn id(&self) -> u8 {
        self.bytes[ID_OFFSET]
    }

    /// Payload length as declared in the header.
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// The declared payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + self.payload_len]
    }

    /// The two trailer bytes directly after the payload, as received.
    pub fn trailer(&self) -> &'a [u8] {
        let start = PAYLOAD_OFFSET + self.payload_len;
        &self.bytes[start..start + TRAILER_LEN]
    }

    /// Total bytes this frame occupies in the stream.
    pub fn wire_len(&self) -> usize {
        self.bytes.len()
    }

    /// Raw frame bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}
