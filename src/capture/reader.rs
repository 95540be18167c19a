//! Capture file reader
//!
//! The whole file is loaded into memory at open time; reading is a cursor
//! over that buffer.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{LinkError, Result};

/// Sequential reader over a recorded byte stream.
#[derive(Debug, Clone)]
pub struct CaptureReader {
    data: Vec<u8>,
    position: usize,
    path: PathBuf,
}

impl CaptureReader {
    /// Open a capture file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path).map_err(|e| LinkError::file_error(path.clone(), e))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(|e| LinkError::file_error(path.clone(), e))?;

        debug!(path = %path.display(), bytes = data.len(), "Opened capture file");
        Ok(Self { data, position: 0, path })
    }

    /// Create a reader over bytes already in memory (for testing)
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into(), position: 0, path: PathBuf::from("<memory>") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total bytes in the capture
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes already handed out by [`read_next`](Self::read_next)
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Next chunk of at most `mtu` bytes, or `None` at end of file.
    ///
    /// An `mtu` of 0 is treated as 1.
    pub fn read_next(&mut self, mtu: usize) -> Option<&[u8]> {
        if self.position >= self.data.len() {
            return None;
        }
        let end = self.position.saturating_add(mtu.max(1)).min(self.data.len());
        let chunk = &self.data[self.position..end];
        self.position = end;
        Some(chunk)
    }

    /// Iterate over the whole capture in `mtu`-sized chunks without moving the cursor.
    pub fn chunks(&self, mtu: usize) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(mtu.max(1))
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
