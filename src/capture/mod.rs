//! Capture files of raw notify-characteristic bytes
//!
//! A capture is the byte stream exactly as the device sent it, with no
//! framing of its own. Fragment boundaries are not stored; replay re-chunks
//! the stream at a chosen MTU, which the scanner is indifferent to.
//!
//! ```rust,no_run
//! use racelink::capture::{CaptureReader, CaptureWriter};
//!
//! fn copy_capture() -> racelink::Result<()> {
//!     let mut reader = CaptureReader::open("session.bin")?;
//!     let mut writer = CaptureWriter::create("copy.bin")?;
//!     while let Some(chunk) = reader.read_next(244) {
//!         writer.write_fragment(chunk)?;
//!     }
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```

mod reader;
mod writer;

pub use reader::CaptureReader;
pub use writer::CaptureWriter;
