//! Nordic UART Service identifiers used by the device
//!
//! The wireless stack subscribes to [`TX_CHARACTERISTIC_UUID`] and forwards
//! each notification to a [`FragmentSender`](super::FragmentSender), then
//! writes [`START_COMMAND`] to [`RX_CHARACTERISTIC_UUID`].

/// UART service
pub const SERVICE_UUID: &str = "6E400001-B5A3-F393-E0A9-E50E24DCCA9E";

/// Host-to-device characteristic (write)
pub const RX_CHARACTERISTIC_UUID: &str = "6E400002-B5A3-F393-E0A9-E50E24DCCA9E";

/// Device-to-host characteristic (notify); carries the live-data stream
pub const TX_CHARACTERISTIC_UUID: &str = "6E400003-B5A3-F393-E0A9-E50E24DCCA9E";

/// Starts the live-data stream
pub const START_COMMAND: &[u8] = b"START\n";

/// MTU to request after connecting
pub const REQUESTED_MTU: u16 = 512;

/// Advertised device names contain this
pub const DEVICE_NAME_MARKER: &str = "RaceBox";

/// Whether an advertised name belongs to a supported device.
pub fn is_supported_device(name: &str) -> bool {
    name.contains(DEVICE_NAME_MARKER)
}
