//! Test utilities for building wire frames and capture fixtures
//!
//! Builders here produce byte streams exactly as the device emits them, so
//! scanner, session and connection tests share one definition of a frame.

#![cfg(any(test, feature = "benchmark"))]

use std::path::{Path, PathBuf};

use crate::protocol::{
    LIVE_DATA_CLASS, LIVE_DATA_ID, LIVE_DATA_PAYLOAD_LEN, PAYLOAD_OFFSET, SYNC_1, SYNC_2, frame_len,
};

/// Builds an 80-byte live-data payload field by field. Unset bytes are zero.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    bytes: Vec<u8>,
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self { bytes: vec![0; LIVE_DATA_PAYLOAD_LEN] }
    }

    pub fn u8(mut self, offset: usize, value: u8) -> Self {
        self.bytes[offset] = value;
        self
    }

    pub fn i16(self, offset: usize, value: i16) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn i32(self, offset: usize, value: i32) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn u32(self, offset: usize, value: u32) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    fn put(mut self, offset: usize, le: &[u8]) -> Self {
        self.bytes[offset..offset + le.len()].copy_from_slice(le);
        self
    }
}

/// Builds one frame around a payload.
///
/// The declared length defaults to the payload's length; the output is always
/// `frame_len(declared)` bytes, the amount the scanner consumes.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    class: u8,
    id: u8,
    payload: Vec<u8>,
    trailer: [u8; 2],
}

impl FrameBuilder {
    pub fn live_data(payload: &[u8]) -> Self {
        Self { class: LIVE_DATA_CLASS, id: LIVE_DATA_ID, payload: payload.to_vec(), trailer: [0, 0] }
    }

    pub fn class(mut self, class: u8) -> Self {
        self.class = class;
        self
    }

    pub fn id(mut self, id: u8) -> Self {
        self.id = id;
        self
    }

    pub fn trailer(mut self, trailer: [u8; 2]) -> Self {
        self.trailer = trailer;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let len = self.payload.len();
        let mut bytes = Vec::with_capacity(frame_len(len));
        bytes.extend_from_slice(&[SYNC_1, SYNC_2, self.class, self.id]);
        bytes.extend_from_slice(&(len as u16).to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes.extend_from_slice(&self.trailer);
        bytes.resize(frame_len(len), 0);
        debug_assert_eq!(bytes.len() - len, frame_len(0));
        debug_assert_eq!(&bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + len], &self.payload[..]);
        bytes
    }
}

/// A complete live-data frame carrying `payload`.
pub fn live_data_frame(payload: &[u8]) -> Vec<u8> {
    FrameBuilder::live_data(payload).build()
}

/// `count` back-to-back frames whose UTC time counts up from 0 and whose
/// speed is 1000 mm/s per frame index.
pub fn frame_stream(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|i| {
            let payload = PayloadBuilder::new().u32(0, i as u32).i32(48, i as i32 * 1000).build();
            live_data_frame(&payload)
        })
        .collect()
}

/// Split `bytes` into chunks of at most `mtu` bytes, like BLE notifications.
pub fn notifications(bytes: &[u8], mtu: usize) -> Vec<Vec<u8>> {
    bytes.chunks(mtu.max(1)).map(<[u8]>::to_vec).collect()
}

/// Write `bytes` as a capture file inside `dir` and return its path.
pub fn write_capture_fixture(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LIVE_DATA_FRAME_LEN;

    #[test]
    fn frame_builder_lays_out_header() {
        let frame = FrameBuilder::live_data(&[7u8; 80]).trailer([0xAA, 0xBB]).build();
        assert_eq!(frame.len(), LIVE_DATA_FRAME_LEN);
        assert_eq!(&frame[..6], &[0xB5, 0x62, 0xFF, 0x01, 80, 0]);
        assert_eq!(&frame[86..88], &[0xAA, 0xBB]);
    }

    #[test]
    fn notifications_respect_mtu() {
        let stream = frame_stream(3);
        let chunks = notifications(&stream, 20);
        assert!(chunks.iter().all(|c| c.len() <= 20));
        assert_eq!(chunks.concat(), stream);
    }
}
