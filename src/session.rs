//! Per-connection reassembly state
//!
//! A [`Session`] owns one accumulator and one scanner. It is the only mutable
//! state in the decode path, so one session must be driven by one task at a
//! time; separate connections get separate sessions.

use tracing::{debug, trace};

use crate::Result;
use crate::protocol::{ByteAccumulator, FrameScanner, LIVE_DATA_FRAME_LEN, PassOutcome, PayloadDecoder, PayloadLayout};
use crate::types::{SessionEvent, SessionStats};

/// Reassembles fragments of one connection into decoded records.
#[derive(Debug, Clone, Default)]
pub struct Session {
    accumulator: ByteAccumulator,
    scanner: FrameScanner,
    stats: SessionStats,
}

impl Session {
    /// Create a session decoding with `layout`.
    ///
    /// Fails if the layout places a field outside the payload.
    pub fn new(layout: PayloadLayout) -> Result<Self> {
        let decoder = PayloadDecoder::new(layout)?;
        Ok(Self {
            accumulator: ByteAccumulator::with_capacity(2 * LIVE_DATA_FRAME_LEN),
            scanner: FrameScanner::new(decoder),
            stats: SessionStats::default(),
        })
    }

    /// Append one fragment and return every record and diagnostic it completed.
    ///
    /// Events are in stream order. An empty result just means no frame is
    /// ready yet.
    pub fn on_fragment(&mut self, fragment: &[u8]) -> Vec<SessionEvent> {
        self.stats.fragments += 1;
        self.stats.bytes_received += fragment.len() as u64;
        self.accumulator.append(fragment);

        let mut events = Vec::new();
        if self.scanner.extract_ready_frames(&mut self.accumulator, &mut events) == PassOutcome::Reset {
            self.stats.resets += 1;
        }

        for event in &events {
            match event {
                SessionEvent::Record(_) => self.stats.records += 1,
                SessionEvent::Diagnostic(diag) => {
                    self.stats.diagnostics += 1;
                    self.stats.bytes_discarded += diag.discarded() as u64;
                }
            }
        }

        trace!(
            fragment_len = fragment.len(),
            events = events.len(),
            buffered = self.accumulator.len(),
            "Processed fragment"
        );
        events
    }

    /// Drop any buffered bytes. Called when the transport disconnects.
    ///
    /// Counters are kept so a connection's totals survive reconnects.
    pub fn reset(&mut self) {
        if !self.accumulator.is_empty() {
            debug!(discarded = self.accumulator.len(), "Session reset with buffered bytes");
            self.stats.bytes_discarded += self.accumulator.len() as u64;
        }
        self.accumulator.reset();
        self.stats.resets += 1;
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Bytes waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.accumulator.len()
    }

    pub fn layout(&self) -> &PayloadLayout {
        self.scanner.decoder().layout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LayoutVariant;
    use crate::test_utils::{PayloadBuilder, live_data_frame};
    use crate::types::DecodeDiagnostic;

    #[test]
    fn frame_split_across_fragments_decodes_once() {
        let frame = live_data_frame(&PayloadBuilder::new().i32(48, 10_000).u8(20, 3).build());
        let mut session = Session::default();

        assert!(session.on_fragment(&frame[..20]).is_empty());
        assert_eq!(session.buffered(), 20);
        assert!(session.on_fragment(&frame[20..60]).is_empty());

        let events = session.on_fragment(&frame[60..]);
        assert_eq!(events.len(), 1);
        let record = events[0].record().unwrap();
        assert_eq!(record.fix_description(), "3D Fix");
        assert_eq!(session.buffered(), 0);
    }

    #[test]
    fn stats_track_bytes_and_events() {
        let frame = live_data_frame(&[0u8; 80]);
        let mut session = Session::default();

        session.on_fragment(&[0xAA, 0xBB, 0xCC]);
        session.on_fragment(&frame);

        let stats = session.stats();
        assert_eq!(stats.fragments, 2);
        assert_eq!(stats.bytes_received, 93);
        assert_eq!(stats.bytes_discarded, 3);
        assert_eq!(stats.records, 1);
        assert_eq!(stats.diagnostics, 1);
        assert_eq!(stats.resets, 0);
    }

    #[test]
    fn reset_drops_partial_frame() {
        let frame = live_data_frame(&[0u8; 80]);
        let mut session = Session::default();

        session.on_fragment(&frame[..50]);
        session.reset();
        assert_eq!(session.buffered(), 0);
        assert_eq!(session.stats().resets, 1);
        assert_eq!(session.stats().bytes_discarded, 50);

        // The tail of the lost frame is garbage to a fresh session
        let events = session.on_fragment(&frame[50..]);
        assert_eq!(events, vec![SessionEvent::Diagnostic(DecodeDiagnostic::NoSyncFound { discarded: 40 })]);

        let events = session.on_fragment(&frame);
        assert_eq!(events.len(), 1);
        assert!(events[0].record().is_some());
    }

    #[test]
    fn sessions_do_not_share_state() {
        let frame = live_data_frame(&[0u8; 80]);
        let mut a = Session::default();
        let mut b = Session::default();

        a.on_fragment(&frame[..45]);
        assert_eq!(b.buffered(), 0);
        assert!(b.on_fragment(&frame[45..]).iter().all(|e| e.record().is_none()));
        assert_eq!(a.on_fragment(&frame[45..]).len(), 1);
    }

    #[test]
    fn legacy_session_uses_legacy_offsets() {
        let payload = PayloadBuilder::new().i32(24, 10_000_000).build();
        let mut session = Session::new(LayoutVariant::Legacy.layout()).unwrap();
        let events = session.on_fragment(&live_data_frame(&payload));
        let record = events[0].record().unwrap();
        assert!((record.latitude - 1.0).abs() < 1e-9);
        assert_eq!(record.battery, None);
    }
}
