//! Capture file writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{LinkError, Result};

/// Appends raw fragments to a capture file.
#[derive(Debug)]
pub struct CaptureWriter {
    out: BufWriter<File>,
    path: PathBuf,
    bytes_written: u64,
}

impl CaptureWriter {
    /// Create (or truncate) a capture file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| LinkError::file_error(path.clone(), e))?;
        Ok(Self { out: BufWriter::new(file), path, bytes_written: 0 })
    }

    pub fn write_fragment(&mut self, fragment: &[u8]) -> Result<()> {
        self.out.write_all(fragment).map_err(|e| LinkError::file_error(self.path.clone(), e))?;
        self.bytes_written += fragment.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush buffered bytes to disk
    pub fn finish(mut self) -> Result<PathBuf> {
        self.out.flush().map_err(|e| LinkError::file_error(self.path.clone(), e))?;
        debug!(path = %self.path.display(), bytes = self.bytes_written, "Capture written");
        Ok(self.path)
    }
}
