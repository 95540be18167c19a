//! Payload field-offset tables
//!
//! Two firmware revisions of the live-data payload disagree on field order and
//! on the width of the IMU fields. Rather than hard-coding either, the decoder
//! reads every offset from a [`PayloadLayout`]. [`PayloadLayout::mini`] is the
//! default; [`PayloadLayout::legacy`] matches the older integration; any other
//! table can be supplied through configuration.

use serde::{Deserialize, Serialize};

use super::frame::LIVE_DATA_PAYLOAD_LEN;
use crate::{LinkError, Result};

/// Integer width of a scaled IMU field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntWidth {
    I16,
    I32,
}

impl IntWidth {
    pub fn size(self) -> usize {
        match self {
            IntWidth::I16 => 2,
            IntWidth::I32 => 4,
        }
    }
}

/// Offsets and scale of a three-axis field. Decoded value = raw / divisor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLayout {
    pub width: IntWidth,
    pub offsets: [usize; 3],
    pub divisor: f64,
}

/// Built-in layout selector used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    #[default]
    Mini,
    Legacy,
}

impl LayoutVariant {
    pub fn layout(self) -> PayloadLayout {
        match self {
            LayoutVariant::Mini => PayloadLayout::mini(),
            LayoutVariant::Legacy => PayloadLayout::legacy(),
        }
    }
}

/// Byte offsets of every live-data field, relative to the payload start.
///
/// Offsets for 32-bit fields (time, position, altitude, speed, heading) are
/// read little-endian. `fix_status`, `battery` and `gyro` are optional because
/// the legacy revision does not carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadLayout {
    pub utc_time: usize,
    pub latitude: usize,
    pub longitude: usize,
    pub altitude_wgs: usize,
    pub altitude_msl: usize,
    pub speed: usize,
    pub heading: usize,
    #[serde(default)]
    pub fix_status: Option<usize>,
    #[serde(default)]
    pub battery: Option<usize>,
    pub accel: AxisLayout,
    #[serde(default)]
    pub gyro: Option<AxisLayout>,
}

impl Default for PayloadLayout {
    fn default() -> Self {
        Self::mini()
    }
}

impl PayloadLayout {
    /// Compact revision: 16-bit IMU fields, fix status and battery byte present.
    pub fn mini() -> Self {
        Self {
            utc_time: 0,
            longitude: 24,
            latitude: 28,
            altitude_wgs: 32,
            altitude_msl: 36,
            speed: 48,
            heading: 52,
            fix_status: Some(20),
            battery: Some(67),
            accel: AxisLayout { width: IntWidth::I16, offsets: [68, 70, 72], divisor: 1e3 },
            gyro: Some(AxisLayout { width: IntWidth::I16, offsets: [74, 76, 78], divisor: 1e2 }),
        }
    }

    /// Older revision: 32-bit IMU fields, latitude first, no fix/battery bytes.
    pub fn legacy() -> Self {
        Self {
            utc_time: 0,
            latitude: 24,
            longitude: 28,
            altitude_wgs: 32,
            altitude_msl: 36,
            speed: 48,
            heading: 52,
            fix_status: None,
            battery: None,
            accel: AxisLayout { width: IntWidth::I32, offsets: [56, 60, 64], divisor: 1e6 },
            gyro: Some(AxisLayout { width: IntWidth::I32, offsets: [68, 72, 76], divisor: 1e5 }),
        }
    }

    /// Check every field fits inside the live-data payload.
    pub fn validate(&self) -> Result<()> {
        let words = [
            ("utc_time", self.utc_time),
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("altitude_wgs", self.altitude_wgs),
            ("altitude_msl", self.altitude_msl),
            ("speed", self.speed),
            ("heading", self.heading),
        ];
        for (field, offset) in words {
            check_fits(field, offset, 4)?;
        }
        if let Some(offset) = self.fix_status {
            check_fits("fix_status", offset, 1)?;
        }
        if let Some(offset) = self.battery {
            check_fits("battery", offset, 1)?;
        }
        check_axes("accel", &self.accel)?;
        if let Some(gyro) = &self.gyro {
            check_axes("gyro", gyro)?;
        }
        Ok(())
    }
}

fn check_fits(field: &str, offset: usize, size: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= LIVE_DATA_PAYLOAD_LEN => Ok(()),
        _ => Err(LinkError::layout_error(
            field,
            format!(
                "{} bytes at offset {} exceed the {}-byte payload",
                size, offset, LIVE_DATA_PAYLOAD_LEN
            ),
        )),
    }
}

fn check_axes(field: &str, axes: &AxisLayout) -> Result<()> {
    if !axes.divisor.is_finite() || axes.divisor == 0.0 {
        return Err(LinkError::layout_error(field, "divisor must be finite and non-zero"));
    }
    for offset in axes.offsets {
        check_fits(field, offset, axes.width.size())?;
    }
    Ok(())
}
