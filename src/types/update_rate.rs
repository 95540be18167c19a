//! Update rate control for record streams

use serde::{Deserialize, Serialize};

/// Update rate for throttled record streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every record as decoded (the device streams at 25Hz)
    Native,

    /// Throttled to maximum Hz
    /// If the requested rate meets or exceeds the source rate, Native is used
    Max(u32),
}

impl UpdateRate {
    /// Normalize rate against source frequency
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Native,
            UpdateRate::Max(hz) if hz as f64 >= source_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Get throttle interval if needed
    pub fn throttle_interval(self, source_hz: f64) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(std::time::Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rates_at_or_above_source_are_native() {
        assert_eq!(UpdateRate::Max(25).normalize(25.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(60).normalize(25.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(0).normalize(25.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(5).normalize(25.0), UpdateRate::Max(5));
    }

    #[test]
    fn throttle_interval_matches_rate() {
        assert_eq!(UpdateRate::Native.throttle_interval(25.0), None);
        assert_eq!(UpdateRate::Max(10).throttle_interval(25.0), Some(Duration::from_millis(100)));
    }
}
