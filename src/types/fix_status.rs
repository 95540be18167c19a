//! GPS fix status decoding

use serde::{Deserialize, Serialize};

/// Position-lock quality reported by the GPS receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixStatus {
    NoFix,
    Fix2D,
    Fix3D,
    /// Any other raw value, kept for diagnostics.
    Unknown(u8),
}

impl FixStatus {
    /// Decode the raw fix-status byte.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => FixStatus::NoFix,
            2 => FixStatus::Fix2D,
            3 => FixStatus::Fix3D,
            other => FixStatus::Unknown(other),
        }
    }

    /// Human-readable label.
    pub fn description(&self) -> &'static str {
        match self {
            FixStatus::NoFix => "No Fix",
            FixStatus::Fix2D => "2D Fix",
            FixStatus::Fix3D => "3D Fix",
            FixStatus::Unknown(_) => "Unknown",
        }
    }

    pub fn has_fix(&self) -> bool {
        matches!(self, FixStatus::Fix2D | FixStatus::Fix3D)
    }
}

impl std::fmt::Display for FixStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
