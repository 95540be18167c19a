//! Decoded live-data record

use serde::{Deserialize, Serialize};

use super::{BatteryStatus, FixStatus};

/// Three-axis IMU reading in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Axes {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Physical-unit representation of one live-data frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveDataRecord {
    /// UTC timestamp in seconds, as reported by the device.
    pub utc_time: u32,
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// Metres above the WGS84 ellipsoid.
    pub altitude_wgs: f64,
    /// Metres above mean sea level.
    pub altitude_msl: f64,
    pub speed_mph: f64,
    /// Degrees.
    pub heading: f64,
    /// `None` when the active payload layout carries no fix-status byte.
    pub fix: Option<FixStatus>,
    /// `None` when the active payload layout carries no battery byte.
    pub battery: Option<BatteryStatus>,
    /// G-force.
    pub accel: Axes,
    /// Rotation rate in degrees per second.
    pub gyro: Option<Axes>,
}

impl LiveDataRecord {
    /// Fix label, or `"Unknown"` when the layout has no fix byte.
    pub fn fix_description(&self) -> &'static str {
        self.fix.map_or("Unknown", |fix| fix.description())
    }

    /// True once the device reports a positive ground speed.
    pub fn is_moving(&self) -> bool {
        self.speed_mph > 0.0
    }
}
