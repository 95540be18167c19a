//! Resynchronizing frame scanner
//!
//! Each [`FrameScanner::step`] looks at the head of the accumulator and does
//! exactly one of: discard garbage up to a sync marker, skip a false sync
//! marker, extract and decode a complete frame, or report that more bytes are
//! needed. [`FrameScanner::extract_ready_frames`] repeats that until it has to
//! wait. Every non-waiting step removes at least one byte, so a pass always
//! terminates.

use tracing::{debug, error, trace};

use super::accumulator::ByteAccumulator;
use super::decoder::PayloadDecoder;
use super::frame::{
    CLASS_OFFSET, Frame, HEADER_LEN, ID_OFFSET, LENGTH_OFFSET, LIVE_DATA_CLASS, LIVE_DATA_ID,
    SYNC_1, SYNC_2, SYNC_LEN, frame_len,
};
use crate::Result;
use crate::types::{DecodeDiagnostic, LiveDataRecord, SessionEvent};

/// Outcome of a single scanner step.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanStep {
    /// A frame was extracted and decoded; its bytes were consumed.
    Record(LiveDataRecord),
    /// Bytes were discarded to resynchronize.
    Diagnostic(DecodeDiagnostic),
    /// Not enough bytes buffered; nothing was consumed.
    Wait,
}

/// How a scan pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The scanner ran to a fixed point and is waiting for more bytes.
    Settled,
    /// An internal bounds check failed and the accumulator was cleared.
    Reset,
}

/// Locates, validates and extracts live-data frames from a [`ByteAccumulator`].
#[derive(Debug, Clone, Default)]
pub struct FrameScanner {
    decoder: PayloadDecoder,
}

impl FrameScanner {
    pub fn new(decoder: PayloadDecoder) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &PayloadDecoder {
        &self.decoder
    }

    /// Extract every complete frame currently buffered, in stream order.
    ///
    /// Events are appended to `events`. Incomplete trailing data stays in the
    /// accumulator for the next fragment.
    pub fn extract_ready_frames(
        &self,
        acc: &mut ByteAccumulator,
        events: &mut Vec<SessionEvent>,
    ) -> PassOutcome {
        while !acc.is_empty() {
            match self.step(acc) {
                Ok(ScanStep::Record(record)) => events.push(SessionEvent::Record(record)),
                Ok(ScanStep::Diagnostic(diag)) => events.push(SessionEvent::Diagnostic(diag)),
                Ok(ScanStep::Wait) => break,
                Err(e) => {
                    // Every read is preceded by a length check, so this means
                    // the scanner itself is wrong. Drop the buffer and carry on.
                    error!(error = %e, buffered = acc.len(), "Scanner bounds check failed, resetting");
                    acc.reset();
                    return PassOutcome::Reset;
                }
            }
        }
        PassOutcome::Settled
    }

    /// Run one iteration of the resync state machine.
    pub fn step(&self, acc: &mut ByteAccumulator) -> Result<ScanStep> {
        // SeekSync
        match acc.find_pair(SYNC_1, SYNC_2) {
            Some(0) => {}
            Some(offset) => {
                acc.consume_prefix(offset)?;
                debug!(discarded = offset, "Skipped bytes before sync marker");
                return Ok(ScanStep::Diagnostic(DecodeDiagnostic::GarbageSkipped {
                    discarded: offset,
                }));
            }
            None if acc.len() == 1 && acc.byte_at(0)? == SYNC_1 => {
                // First half of a sync pair split across fragments
                return Ok(ScanStep::Wait);
            }
            None => {
                let discarded = acc.len();
                acc.reset();
                debug!(discarded, "No sync marker in buffer, discarded everything");
                return Ok(ScanStep::Diagnostic(DecodeDiagnostic::NoSyncFound { discarded }));
            }
        }

        // HeaderCheck
        if acc.len() < HEADER_LEN {
            return Ok(ScanStep::Wait);
        }
        let class = acc.byte_at(CLASS_OFFSET)?;
        let id = acc.byte_at(ID_OFFSET)?;
        if class != LIVE_DATA_CLASS || id != LIVE_DATA_ID {
            acc.consume_prefix(SYNC_LEN)?;
            debug!(class, id, "Unexpected message header, skipping sync bytes");
            return Ok(ScanStep::Diagnostic(DecodeDiagnostic::HeaderMismatch { class, id }));
        }

        // LengthCheck
        let payload_len = acc.read_u16_le(LENGTH_OFFSET)? as usize;
        let total = frame_len(payload_len);
        if acc.len() < total {
            trace!(payload_len, buffered = acc.len(), needed = total, "Waiting for frame");
            return Ok(ScanStep::Wait);
        }

        // Extract
        let decoded = self.decoder.decode(&Frame::new(acc.slice(0, total)?, payload_len));
        match decoded {
            Ok(record) => {
                acc.consume_prefix(total)?;
                trace!(
                    utc_time = record.utc_time,
                    speed_mph = record.speed_mph,
                    remaining = acc.len(),
                    "Decoded live-data frame"
                );
                Ok(ScanStep::Record(record))
            }
            Err(diag) => {
                acc.consume_prefix(SYNC_LEN)?;
                debug!(%diag, "Rejected frame candidate, skipping sync bytes");
                Ok(ScanStep::Diagnostic(diag))
            }
        }
    }
}
