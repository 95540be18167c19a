//! Live-data payload decoder

use tracing::trace;

use super::frame::{Frame, LIVE_DATA_PAYLOAD_LEN};
use super::layout::{AxisLayout, IntWidth, PayloadLayout};
use crate::types::{Axes, BatteryStatus, DecodeDiagnostic, FixStatus, LiveDataRecord};
use crate::Result;

/// Millimetres per second to miles per hour, applied after dividing by 1000.
const MPS_TO_MPH: f64 = 2.23694;
const DEGREE_SCALE: f64 = 1e-7;
const ALTITUDE_SCALE: f64 = 1e-3;
const HEADING_SCALE: f64 = 1e-5;

/// Decodes validated live-data payloads into [`LiveDataRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct PayloadDecoder {
    layout: PayloadLayout,
}

impl PayloadDecoder {
    /// Create a decoder for a validated layout.
    pub fn new(layout: PayloadLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &PayloadLayout {
        &self.layout
    }

    /// Decode a frame whose class and id already matched the live-data message.
    ///
    /// Rejects frames whose payload is not exactly 80 bytes. Never panics for
    /// an 80-byte payload since every layout offset was validated against that
    /// length.
    pub fn decode(&self, frame: &Frame<'_>) -> std::result::Result<LiveDataRecord, DecodeDiagnostic> {
        if frame.payload_len() != LIVE_DATA_PAYLOAD_LEN {
            return Err(DecodeDiagnostic::PayloadLengthMismatch {
                expected: LIVE_DATA_PAYLOAD_LEN,
                actual: frame.payload_len(),
            });
        }
        Ok(self.decode_payload(frame.payload()))
    }

    fn decode_payload(&self, p: &[u8]) -> LiveDataRecord {
        let l = &self.layout;

        let speed_mm_s = i32_at(p, l.speed);

        LiveDataRecord {
            utc_time: u32_at(p, l.utc_time),
            latitude: i32_at(p, l.latitude) as f64 * DEGREE_SCALE,
            longitude: i32_at(p, l.longitude) as f64 * DEGREE_SCALE,
            altitude_wgs: i32_at(p, l.altitude_wgs) as f64 * ALTITUDE_SCALE,
            altitude_msl: i32_at(p, l.altitude_msl) as f64 * ALTITUDE_SCALE,
            speed_mph: (speed_mm_s as f64 / 1000.0) * MPS_TO_MPH,
            heading: i32_at(p, l.heading) as f64 * HEADING_SCALE,
            fix: l.fix_status.map(|off| FixStatus::from_raw(p[off])),
            battery: l.battery.map(|off| BatteryStatus::new(p[off])),
            accel: axes(p, &l.accel, "accel"),
            gyro: l.gyro.as_ref().map(|gyro| axes(p, gyro, "gyro")),
        }
    }
}

fn u32_at(p: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([p[off], p[off + 1], p[off + 2], p[off + 3]])
}

fn i32_at(p: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([p[off], p[off + 1], p[off + 2], p[off + 3]])
}

fn i16_at(p: &[u8], off: usize) -> i16 {
    i16::from_le_bytes([p[off], p[off + 1]])
}

fn axes(p: &[u8], layout: &AxisLayout, name: &str) -> Axes {
    let raw = layout.offsets.map(|off| match layout.width {
        IntWidth::I16 => i16_at(p, off) as i64,
        IntWidth::I32 => i32_at(p, off) as i64,
    });
    trace!(x = raw[0], y = raw[1], z = raw[2], "Raw {} axes", name);

    Axes {
        x: raw[0] as f64 / layout.divisor,
        y: raw[1] as f64 / layout.divisor,
        z: raw[2] as f64 / layout.divisor,
    }
}
