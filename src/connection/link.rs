//! Consumer-facing connection over a running driver

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{Stream, StreamExt, future};
use futures::stream::BoxStream;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::driver::Driver;
use crate::session::Session;
use crate::stream::ThrottleExt;
use crate::transport::Transport;
use crate::types::{DecodeDiagnostic, LinkStatus, LiveDataRecord, SessionEvent, SessionStats, UpdateRate};
use crate::{LinkError, Result};

/// A decoding connection to one device.
///
/// Dropping the connection stops its driver task.
pub struct LinkConnection {
    /// Receiver subscribed before the driver started; handed to the first
    /// event stream so it sees every event from the start
    first_events: Mutex<Option<broadcast::Receiver<SessionEvent>>>,

    /// Template for later subscribers
    events: broadcast::Receiver<SessionEvent>,

    latest: watch::Receiver<Option<Arc<LiveDataRecord>>>,
    status: watch::Receiver<LinkStatus>,
    stats: watch::Receiver<SessionStats>,

    /// Source frequency
    record_rate: f64,

    /// Cancellation token for stopping the driver
    cancel: CancellationToken,
}

impl LinkConnection {
    /// Start decoding fragments from `transport`.
    ///
    /// Must be called from within a tokio runtime. Fails only if the
    /// configuration is invalid.
    pub fn attach<T: Transport>(transport: T, config: &LinkConfig) -> Result<Self> {
        config.validate()?;
        let session = Session::new(config.payload_layout())?;
        let record_rate = transport.record_rate();

        let channels = Driver::spawn(transport, session, config.driver_options());
        info!(record_rate, layout = ?config.layout, "Link attached");

        let events = channels.events.resubscribe();
        Ok(Self {
            first_events: Mutex::new(Some(channels.events)),
            events,
            latest: channels.latest,
            status: channels.status,
            stats: channels.stats,
            record_rate,
            cancel: channels.cancel,
        })
    }

    fn event_receiver(&self) -> broadcast::Receiver<SessionEvent> {
        let first = match self.first_events.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        first.unwrap_or_else(|| self.events.resubscribe())
    }

    /// Every record and diagnostic in stream order.
    ///
    /// The first stream created on a connection starts at the first event;
    /// later streams start at the moment they are created. A subscriber more
    /// than `channel_capacity` events behind loses the oldest ones (logged at
    /// warn). Ends when the driver stops.
    pub fn events(&self) -> impl Stream<Item = SessionEvent> + Send + 'static {
        BroadcastStream::new(self.event_receiver()).filter_map(|item| {
            future::ready(match item {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscriber lagging, events dropped");
                    None
                }
            })
        })
    }

    /// Every decoded record in stream order.
    pub fn records(&self) -> impl Stream<Item = LiveDataRecord> + Send + 'static {
        self.events().filter_map(|event| future::ready(event.into_record()))
    }

    /// Resync diagnostics only.
    pub fn diagnostics(&self) -> impl Stream<Item = DecodeDiagnostic> + Send + 'static {
        self.events().filter_map(|event| {
            future::ready(match event {
                SessionEvent::Diagnostic(diag) => Some(diag),
                SessionEvent::Record(_) => None,
            })
        })
    }

    /// Latest-wins record stream at up to `rate`.
    ///
    /// Intermediate records are skipped; use [`records`](Self::records) when
    /// every record matters.
    pub fn subscribe(&self, rate: UpdateRate) -> BoxStream<'static, Arc<LiveDataRecord>> {
        let records = WatchStream::from_changes(self.latest.clone()).filter_map(future::ready);

        match rate.throttle_interval(self.record_rate) {
            None => records.boxed(),
            Some(interval) => records.throttle(interval).boxed(),
        }
    }

    /// Most recent record, if any has been decoded.
    pub fn latest(&self) -> Option<Arc<LiveDataRecord>> {
        self.latest.borrow().clone()
    }

    /// Wait up to `timeout` for a record to be available.
    ///
    /// Returns immediately if one has already been decoded. Fails with
    /// [`LinkError::ChannelClosed`] if the driver stops first.
    pub async fn wait_for_record(&self, timeout: Duration) -> Result<Arc<LiveDataRecord>> {
        let mut latest = self.latest.clone();
        let waited = tokio::time::timeout(timeout, async move {
            latest.wait_for(Option::is_some).await.ok().and_then(|record| record.clone())
        })
        .await;

        match waited {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(LinkError::ChannelClosed),
            Err(_) => Err(LinkError::Timeout { duration: timeout }),
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status.borrow().clone()
    }

    /// Status changes, starting with the current status.
    pub fn status_updates(&self) -> impl Stream<Item = LinkStatus> + Send + 'static {
        WatchStream::new(self.status.clone())
    }

    pub fn stats(&self) -> SessionStats {
        *self.stats.borrow()
    }

    /// Wait until the driver stops and return the final status.
    pub async fn closed(&self) -> LinkStatus {
        let mut status = self.status.clone();
        if let Ok(final_status) = status.wait_for(LinkStatus::is_disconnected).await {
            return final_status.clone();
        }
        // Sender gone without a final status; report what we last saw
        status.borrow().clone()
    }

    /// Nominal record rate of the transport in Hz
    pub fn record_rate(&self) -> f64 {
        self.record_rate
    }

    /// Stop the driver. The session is reset and status becomes disconnected.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LinkConnection {
    fn drop(&mut self) {
        debug!("Dropping link connection");
        self.cancel.cancel();
    }
}
