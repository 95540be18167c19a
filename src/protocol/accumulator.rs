//! Growable byte accumulator for bytes received but not yet classified
//!
//! Prefix discards only advance a read cursor; the consumed region is
//! compacted away lazily on the next append so a scan pass that drops many
//! small prefixes never shifts the tail more than once.

use crate::{LinkError, Result};

/// Bytes received on one session and not yet consumed into a frame.
///
/// Grows by appending fragments and shrinks only by discarding a contiguous
/// prefix. Bytes are never reordered or duplicated.
#[derive(Debug, Default, Clone)]
pub struct ByteAccumulator {
    data: Vec<u8>,
    start: usize,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator with room for `capacity` bytes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity), start: 0 }
    }

    /// Append a fragment to the tail. No length limit is enforced.
    pub fn append(&mut self, fragment: &[u8]) {
        if self.start > 0 {
            self.data.drain(..self.start);
            self.start = 0;
        }
        self.data.extend_from_slice(fragment);
    }

    /// Discard the first `n` bytes.
    pub fn consume_prefix(&mut self, n: usize) -> Result<()> {
        let available = self.len();
        if n > available {
            return Err(LinkError::out_of_range(0, n, available));
        }
        self.start += n;
        if self.start == self.data.len() {
            self.data.clear();
            self.start = 0;
        }
        Ok(())
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.data.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear to empty.
    pub fn reset(&mut self) {
        self.data.clear();
        self.start = 0;
    }

    /// The buffered bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..]
    }

    /// Bounds-checked view of `len` bytes at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let available = self.len();
        offset
            .checked_add(len)
            .filter(|end| *end <= available)
            .map(|end| &self.as_slice()[offset..end])
            .ok_or_else(|| LinkError::out_of_range(offset, len, available))
    }

    pub fn byte_at(&self, index: usize) -> Result<u8> {
        Ok(self.slice(index, 1)?[0])
    }

    pub fn read_u16_le(&self, offset: usize) -> Result<u16> {
        let b = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_i16_le(&self, offset: usize) -> Result<i16> {
        let b = self.slice(offset, 2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32> {
        let b = self.slice(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32_le(&self, offset: usize) -> Result<i32> {
        let b = self.slice(offset, 4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Offset of the first `first` byte immediately followed by `second`.
    pub fn find_pair(&self, first: u8, second: u8) -> Option<usize> {
        self.as_slice().windows(2).position(|w| w[0] == first && w[1] == second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_consume_preserve_order() {
        let mut acc = ByteAccumulator::new();
        acc.append(&[1, 2, 3]);
        acc.append(&[4, 5]);
        assert_eq!(acc.as_slice(), &[1, 2, 3, 4, 5]);

        acc.consume_prefix(2).unwrap();
        assert_eq!(acc.as_slice(), &[3, 4, 5]);

        acc.append(&[6]);
        assert_eq!(acc.as_slice(), &[3, 4, 5, 6]);
        assert_eq!(acc.len(), 4);
    }

    #[test]
    fn consume_more_than_buffered_is_out_of_range() {
        let mut acc = ByteAccumulator::new();
        acc.append(&[1, 2]);
        let err = acc.consume_prefix(3).unwrap_err();
        assert!(matches!(err, LinkError::OutOfRange { len: 3, available: 2, .. }));
        // Nothing was discarded
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn consuming_everything_empties_the_buffer() {
        let mut acc = ByteAccumulator::new();
        acc.append(&[1, 2, 3]);
        acc.consume_prefix(3).unwrap();
        assert!(acc.is_empty());
        acc.consume_prefix(0).unwrap();
        assert!(acc.is_empty());
    }

    #[test]
    fn little_endian_reads() {
        let mut acc = ByteAccumulator::new();
        acc.append(&[0x50, 0x00, 0xFF, 0xFF, 0x10, 0x27, 0x00, 0x00]);
        assert_eq!(acc.read_u16_le(0).unwrap(), 80);
        assert_eq!(acc.read_i16_le(2).unwrap(), -1);
        assert_eq!(acc.read_i32_le(4).unwrap(), 10_000);
        assert_eq!(acc.read_u32_le(4).unwrap(), 10_000);
        assert_eq!(acc.byte_at(7).unwrap(), 0);
    }

    #[test]
    fn reads_past_the_end_fail() {
        let mut acc = ByteAccumulator::new();
        acc.append(&[1, 2, 3]);
        assert!(acc.byte_at(3).is_err());
        assert!(acc.read_u16_le(2).is_err());
        assert!(acc.read_i32_le(0).is_err());
        assert!(acc.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn reads_are_relative_to_unconsumed_data() {
        let mut acc = ByteAccumulator::new();
        acc.append(&[9, 9, 0x34, 0x12]);
        acc.consume_prefix(2).unwrap();
        assert_eq!(acc.read_u16_le(0).unwrap(), 0x1234);
    }

    #[test]
    fn find_pair_requires_adjacent_bytes() {
        let mut acc = ByteAccumulator::new();
        acc.append(&[0xB5, 0x00, 0x62, 0xB5, 0x62]);
        assert_eq!(acc.find_pair(0xB5, 0x62), Some(3));

        acc.reset();
        acc.append(&[0xB5]);
        assert_eq!(acc.find_pair(0xB5, 0x62), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut acc = ByteAccumulator::with_capacity(16);
        acc.append(&[1, 2, 3]);
        acc.consume_prefix(1).unwrap();
        acc.reset();
        assert!(acc.is_empty());
        assert_eq!(acc.as_slice(), &[] as &[u8]);
    }
}
