//! Fragment sources
//!
//! A [`Transport`] hands the driver raw notification bytes in arrival order.
//! The wireless stack itself lives outside this crate; it feeds a
//! [`ChannelTransport`] through a [`FragmentSender`]. Recorded sessions are
//! replayed through a [`CaptureTransport`].

mod capture;
mod channel;
pub mod nus;

pub use capture::CaptureTransport;
pub use channel::{ChannelTransport, FragmentSender, channel};

use crate::Result;
use crate::types::Fragment;

/// Live-data records per second sent by the device.
pub const DEVICE_RATE_HZ: f64 = 25.0;

/// Trait for fragment sources
///
/// Transports handle their own timing; the driver simply awaits the next
/// fragment.
#[async_trait::async_trait]
pub trait Transport: Send + 'static {
    /// Get the next fragment
    ///
    /// Returns:
    /// - `Ok(Some(fragment))` - Bytes arrived
    /// - `Ok(None)` - Link closed (normal termination)
    /// - `Err(e)` - Transport error; [`LinkError::is_retryable`](crate::LinkError::is_retryable)
    ///   tells the driver whether to try again
    async fn next_fragment(&mut self) -> Result<Option<Fragment>>;

    /// Nominal record rate of the source in Hz, used to normalize throttled
    /// subscriptions.
    fn record_rate(&self) -> f64 {
        DEVICE_RATE_HZ
    }
}
