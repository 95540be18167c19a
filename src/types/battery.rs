//! Packed battery status byte

use serde::{Deserialize, Serialize};

const CHARGING_BIT: u8 = 0x80;
const PERCENT_MASK: u8 = 0x7F;

/// Battery status packed into one byte: bit 7 is the charging flag, bits 0-6
/// the charge percentage.
///
/// The percentage is not clamped to 100; values up to 127 are reported as
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus(pub u8);

impl BatteryStatus {
    pub fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub fn is_charging(&self) -> bool {
        (self.0 & CHARGING_BIT) != 0
    }

    /// Charge percentage as stored (0-127).
    pub fn percent(&self) -> u8 {
        self.0 & PERCENT_MASK
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}
