//! Wire protocol: byte accumulation, frame resynchronization and payload decoding.
//!
//! Bytes flow `ByteAccumulator::append` → `FrameScanner::extract_ready_frames`
//! → `PayloadDecoder::decode`. Everything here is synchronous and owned by a
//! single [`Session`](crate::session::Session).

mod accumulator;
mod decoder;
mod frame;
mod layout;
mod scanner;

pub use accumulator::ByteAccumulator;
pub use decoder::PayloadDecoder;
pub use frame::{
    Frame, HEADER_LEN, LIVE_DATA_CLASS, LIVE_DATA_FRAME_LEN, LIVE_DATA_ID, LIVE_DATA_PAYLOAD_LEN,
    PAYLOAD_OFFSET, SYNC_1, SYNC_2, SYNC_LEN, TRAILER_LEN, frame_len,
};
pub use layout::{AxisLayout, IntWidth, LayoutVariant, PayloadLayout};
pub use scanner::{FrameScanner, PassOutcome, ScanStep};
