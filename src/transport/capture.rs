//! Replay transport for capture files

use std::path::Path;

use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info};

use super::Transport;
use crate::Result;
use crate::capture::CaptureReader;
use crate::types::Fragment;

/// Replays a capture file as MTU-sized fragments.
pub struct CaptureTransport {
    reader: CaptureReader,
    mtu: usize,
    /// Pacing between fragments; `None` replays as fast as the consumer reads
    pacing: Option<Interval>,
    sequence: u64,
}

impl CaptureTransport {
    /// Open a capture file and replay it in chunks of `mtu` bytes
    pub fn open<P: AsRef<Path>>(path: P, mtu: usize) -> Result<Self> {
        let reader = CaptureReader::open(path)?;
        info!(bytes = reader.len(), mtu, "Opened capture for replay");
        Ok(Self::new(reader, mtu))
    }

    pub fn new(reader: CaptureReader, mtu: usize) -> Self {
        Self { reader, mtu: mtu.max(1), pacing: None, sequence: 0 }
    }

    /// Wait `period` between fragments. A zero period disables pacing.
    pub fn with_pacing(mut self, period: Duration) -> Self {
        self.pacing = (!period.is_zero()).then(|| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        self
    }

    pub fn mtu(&self) -> usize {
        self.mtu
    }

    /// Fraction of the capture already replayed, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.reader.is_empty() {
            return 1.0;
        }
        self.reader.position() as f64 / self.reader.len() as f64
    }
}

#[async_trait::async_trait]
impl Transport for CaptureTransport {
    async fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        if self.reader.remaining() == 0 {
            debug!("Reached end of capture");
            return Ok(None);
        }

        match self.pacing.as_mut() {
            Some(pacing) => {
                pacing.tick().await;
            }
            // Let subscribers drain between fragments
            None => tokio::task::yield_now().await,
        }

        let Some(chunk) = self.reader.read_next(self.mtu) else {
            return Ok(None);
        };
        let fragment = Fragment::new(chunk.to_vec(), self.sequence);
        self.sequence += 1;
        Ok(Some(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::frame_stream;

    #[tokio::test]
    async fn replays_capture_in_mtu_chunks() {
        let stream = frame_stream(2);
        let mut transport = CaptureTransport::new(CaptureReader::from_bytes(stream.clone()), 64);

        let mut replayed = Vec::new();
        let mut sequences = Vec::new();
        while let Some(fragment) = transport.next_fragment().await.unwrap() {
            assert!(fragment.len() <= 64);
            sequences.push(fragment.sequence);
            replayed.extend_from_slice(fragment.as_bytes());
        }

        assert_eq!(replayed, stream);
        assert_eq!(sequences, vec![0, 1, 2]);
        assert_eq!(transport.progress(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_spaces_fragments() {
        let reader = CaptureReader::from_bytes(vec![0u8; 30]);
        let mut transport = CaptureTransport::new(reader, 10).with_pacing(Duration::from_millis(40));

        let start = tokio::time::Instant::now();
        while transport.next_fragment().await.unwrap().is_some() {}

        // First tick is immediate, then two 40ms waits
        assert_eq!(start.elapsed(), Duration::from_millis(80));
    }
}
