//! Driver spawns and manages the per-connection decode task

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::session::Session;
use crate::transport::Transport;
use crate::types::{LinkStatus, LiveDataRecord, SessionEvent, SessionStats};

/// Tuning for a spawned driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Events buffered per subscriber before the slowest one starts lagging
    pub channel_capacity: usize,
    /// Consecutive retryable transport errors tolerated before giving up
    pub max_transport_errors: u32,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self { channel_capacity: 1024, max_transport_errors: 10 }
    }
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Every record and diagnostic, in stream order. Subscribed before the
    /// task starts, so nothing is missed.
    pub events: broadcast::Receiver<SessionEvent>,
    /// Most recent record
    pub latest: watch::Receiver<Option<Arc<LiveDataRecord>>>,
    /// Connection state
    pub status: watch::Receiver<LinkStatus>,
    /// Session counters, updated after every fragment
    pub stats: watch::Receiver<SessionStats>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns the task that owns a transport and its session
///
/// The task is the only code touching the session, so fragments are
/// processed strictly one after another.
pub struct Driver;

impl Driver {
    /// Spawn the decode task for `transport`
    pub fn spawn<T>(transport: T, session: Session, options: DriverOptions) -> DriverChannels
    where
        T: Transport,
    {
        let (event_tx, event_rx) = broadcast::channel(options.channel_capacity.max(1));
        let (latest_tx, latest_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(LinkStatus::Connecting);
        let (stats_tx, stats_rx) = watch::channel(session.stats());

        let cancel = CancellationToken::new();
        let task = DriverTask {
            session,
            options,
            event_tx,
            latest_tx,
            status_tx,
            stats_tx,
            cancel: cancel.clone(),
        };

        tokio::spawn(task.run(transport));

        DriverChannels { events: event_rx, latest: latest_rx, status: status_rx, stats: stats_rx, cancel }
    }
}

struct DriverTask {
    session: Session,
    options: DriverOptions,
    event_tx: broadcast::Sender<SessionEvent>,
    latest_tx: watch::Sender<Option<Arc<LiveDataRecord>>>,
    status_tx: watch::Sender<LinkStatus>,
    stats_tx: watch::Sender<SessionStats>,
    cancel: CancellationToken,
}

impl DriverTask {
    async fn run<T: Transport>(mut self, mut transport: T) {
        info!("Driver task started");
        let mut error_count = 0u32;

        let reason = loop {
            let result = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Driver cancelled");
                    break "cancelled".to_string();
                }
                result = transport.next_fragment() => result,
            };

            match result {
                Ok(Some(fragment)) => {
                    error_count = 0;
                    if !matches!(*self.status_tx.borrow(), LinkStatus::Streaming) {
                        info!("Link streaming");
                        self.status_tx.send_replace(LinkStatus::Streaming);
                    }

                    trace!(sequence = fragment.sequence, len = fragment.len(), "Processing fragment");
                    for event in self.session.on_fragment(fragment.as_bytes()) {
                        self.publish(event);
                    }
                    self.stats_tx.send_replace(self.session.stats());

                    if self.status_tx.is_closed() {
                        debug!("All receivers dropped, shutting down");
                        break "connection dropped".to_string();
                    }
                }
                Ok(None) => {
                    info!("Transport closed");
                    break "transport closed".to_string();
                }
                Err(e) if e.is_retryable() && error_count < self.options.max_transport_errors => {
                    error_count += 1;
                    warn!(
                        error = %e,
                        attempt = error_count,
                        max = self.options.max_transport_errors,
                        "Transport error, retrying"
                    );
                    // Bytes were lost in between; a partial frame is no longer trustworthy
                    self.session.reset();
                    self.stats_tx.send_replace(self.session.stats());

                    // Exponential backoff: 50ms, 100ms, 200ms, ...
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            info!("Driver cancelled during backoff");
                            break "cancelled".to_string();
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
                Err(e) => {
                    error!(error = %e, "Transport failed, shutting down");
                    break e.to_string();
                }
            }
        };

        self.session.reset();
        let stats = self.session.stats();
        self.stats_tx.send_replace(stats);
        self.status_tx.send_replace(LinkStatus::Disconnected { reason });
        info!(records = stats.records, diagnostics = stats.diagnostics, "Driver task ended");
    }

    fn publish(&self, event: SessionEvent) {
        if let SessionEvent::Record(record) = &event {
            self.latest_tx.send_replace(Some(Arc::new(record.clone())));
        }
        // No subscribers is fine; the watch channels still carry state
        let _ = self.event_tx.send(event);
    }
}
