//! Live-data decoding for Bluetooth LE GPS/IMU lap timers.
//!
//! The device streams fixed-size binary frames over a Nordic UART notify
//! characteristic. Notifications split and merge frames arbitrarily and the
//! link drops or corrupts bytes during connection churn. racelink reassembles
//! that byte stream, resynchronizes on corruption and decodes each frame into a
//! [`LiveDataRecord`].
//!
//! # Layers
//!
//! - **[`protocol`]**: accumulator, resync scanner and payload decoder;
//!   synchronous and allocation-light
//! - **[`Session`]**: one connection's decode state, fed fragment by fragment
//! - **[`transport`]**: where fragments come from (a channel fed by your BLE
//!   stack, or a capture file)
//! - **[`LinkConnection`]**: a spawned driver task with record, diagnostic and
//!   throttled streams
//!
//! # Quick Start
//!
//! Using a session directly:
//!
//! ```rust
//! use racelink::{Session, SessionEvent};
//!
//! let mut session = Session::default();
//! // A notification with no sync marker is discarded as garbage
//! let events = session.on_fragment(&[0x00, 0x01, 0x02]);
//! assert!(matches!(events[0], SessionEvent::Diagnostic(_)));
//! assert_eq!(session.buffered(), 0);
//! ```
//!
//! ## Example (BLE stack integration)
//!
//! ```rust,no_run
//! use racelink::{LinkConfig, RaceLink, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> racelink::Result<()> {
//!     let (sender, connection) = RaceLink::channel(&LinkConfig::default())?;
//!
//!     // In the notify callback for racelink::transport::nus::TX_CHARACTERISTIC_UUID:
//!     sender.try_send(vec![0xB5, 0x62])?;
//!
//!     let mut updates = connection.subscribe(UpdateRate::Max(5));
//!     while let Some(record) = updates.next().await {
//!         println!("{:.1} mph, {}", record.speed_mph, record.fix_description());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod protocol;
pub mod session;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Stream-based link architecture
pub mod capture;
pub mod connection;
pub mod driver;
pub mod stream;
pub mod transport;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use config::LinkConfig;
pub use connection::LinkConnection;
pub use session::Session;
pub use transport::{CaptureTransport, ChannelTransport, FragmentSender, Transport};

/// Unified entry point for link connections.
///
/// # Examples
///
/// ## Capture replay
/// ```rust,no_run
/// use racelink::RaceLink;
/// use futures::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> racelink::Result<()> {
///     let connection = RaceLink::replay("session.bin").await?;
///     let mut records = connection.records();
///     while let Some(record) = records.next().await {
///         println!("{} {:.5},{:.5}", record.utc_time, record.latitude, record.longitude);
///     }
///     Ok(())
/// }
/// ```
pub struct RaceLink;

impl RaceLink {
    /// Start decoding fragments from any transport.
    pub fn attach<T: Transport>(transport: T, config: &LinkConfig) -> Result<LinkConnection> {
        LinkConnection::attach(transport, config)
    }

    /// Create a connection fed through a [`FragmentSender`].
    ///
    /// Hand the sender to the wireless stack's notification callback.
    /// Dropping every sender disconnects the link.
    pub fn channel(config: &LinkConfig) -> Result<(FragmentSender, LinkConnection)> {
        let (sender, transport) = transport::channel(config.channel_capacity);
        let connection = LinkConnection::attach(transport, config)?;
        Ok((sender, connection))
    }

    /// Replay a capture file with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not readable.
    pub async fn replay<P: AsRef<std::path::Path>>(path: P) -> Result<LinkConnection> {
        Self::replay_with(path, &LinkConfig::default()).await
    }

    /// Replay a capture file using the `replay` and layout settings of `config`.
    pub async fn replay_with<P: AsRef<std::path::Path>>(
        path: P,
        config: &LinkConfig,
    ) -> Result<LinkConnection> {
        let path = path.as_ref().to_path_buf();
        let mtu = config.replay.mtu;
        let reader = tokio::task::spawn_blocking(move || capture::CaptureReader::open(path))
            .await
            .map_err(|e| LinkError::Parse { context: "capture load".into(), details: e.to_string() })??;

        let transport = CaptureTransport::new(reader, mtu).with_pacing(config.replay.interval());
        LinkConnection::attach(transport, config)
    }
}
