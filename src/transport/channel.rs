//! Channel-fed transport for callback-driven wireless stacks

use tokio::sync::mpsc;
use tracing::trace;

use super::Transport;
use crate::types::Fragment;
use crate::{LinkError, Result};

type Delivery = Result<Vec<u8>>;

/// Create a connected sender/transport pair buffering up to `capacity` deliveries.
pub fn channel(capacity: usize) -> (FragmentSender, ChannelTransport) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (FragmentSender { tx }, ChannelTransport { rx, sequence: 0 })
}

/// Handle given to the wireless stack's notification callback.
///
/// Cloneable. When every sender is dropped the transport reports the link as
/// closed.
#[derive(Debug, Clone)]
pub struct FragmentSender {
    tx: mpsc::Sender<Delivery>,
}

impl FragmentSender {
    /// Queue one notification's bytes, waiting for room if the queue is full.
    pub async fn send(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.tx.send(Ok(bytes.into())).await.map_err(|_| LinkError::ChannelClosed)
    }

    /// Queue bytes from a synchronous callback.
    ///
    /// Fails with a retryable transport error when the queue is full; the
    /// bytes are lost and the scanner resynchronizes on the next frame.
    pub fn try_send(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.tx.try_send(Ok(bytes.into())).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => LinkError::transport_failed("fragment queue full"),
            mpsc::error::TrySendError::Closed(_) => LinkError::ChannelClosed,
        })
    }

    /// Report a transport failure (for example a monitor error from the stack).
    pub async fn fail(&self, error: LinkError) -> Result<()> {
        self.tx.send(Err(error)).await.map_err(|_| LinkError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Completes once the transport side has been dropped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

/// Transport receiving fragments from a [`FragmentSender`].
#[derive(Debug)]
pub struct ChannelTransport {
    rx: mpsc::Receiver<Delivery>,
    sequence: u64,
}

#[async_trait::async_trait]
impl Transport for ChannelTransport {
    async fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        match self.rx.recv().await {
            Some(Ok(bytes)) => {
                let fragment = Fragment::new(bytes, self.sequence);
                self.sequence += 1;
                trace!(sequence = fragment.sequence, len = fragment.len(), "Fragment received");
                Ok(Some(fragment))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fragments_arrive_in_order_with_sequence_numbers() {
        let (tx, mut transport) = channel(4);
        tx.send(vec![1, 2]).await.unwrap();
        tx.send(vec![3]).await.unwrap();
        drop(tx);

        let first = transport.next_fragment().await.unwrap().unwrap();
        let second = transport.next_fragment().await.unwrap().unwrap();
        assert_eq!((first.as_bytes(), first.sequence), (&[1, 2][..], 0));
        assert_eq!((second.as_bytes(), second.sequence), (&[3][..], 1));
        assert!(transport.next_fragment().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reported_failures_surface_as_errors() {
        let (tx, mut transport) = channel(4);
        tx.fail(LinkError::transport_failed("monitor error")).await.unwrap();

        let err = transport.next_fragment().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn try_send_reports_full_queue() {
        let (tx, _transport) = channel(1);
        tx.try_send(vec![1]).unwrap();
        let err = tx.try_send(vec![2]).unwrap_err();
        assert!(matches!(err, LinkError::Transport { .. }));
    }

    #[tokio::test]
    async fn send_after_transport_dropped_is_channel_closed() {
        let (tx, transport) = channel(1);
        drop(transport);
        assert!(tx.is_closed());
        assert!(matches!(tx.send(vec![1]).await, Err(LinkError::ChannelClosed)));
    }
}
