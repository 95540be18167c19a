//! Link configuration
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! layout: legacy           # mini (default) | legacy
//! channel_capacity: 1024   # events buffered per subscriber
//! max_transport_errors: 10 # consecutive retryable errors before disconnect
//! replay:
//!   mtu: 512
//!   interval_ms: 40
//! ```
//!
//! A `custom_layout` table overrides `layout` entirely; see
//! [`PayloadLayout`] for its fields.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::DriverOptions;
use crate::protocol::{LayoutVariant, PayloadLayout};
use crate::{LinkError, Result};

/// Settings for capture replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Fragment size used to re-chunk the capture
    pub mtu: usize,
    /// Delay between fragments; 0 replays as fast as possible
    pub interval_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { mtu: crate::transport::nus::REQUESTED_MTU as usize, interval_ms: 0 }
    }
}

impl ReplayConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Configuration for a [`LinkConnection`](crate::connection::LinkConnection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Built-in payload layout
    pub layout: LayoutVariant,
    /// Explicit field table, used instead of `layout` when present
    pub custom_layout: Option<PayloadLayout>,
    pub channel_capacity: usize,
    pub max_transport_errors: u32,
    pub replay: ReplayConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        let driver = DriverOptions::default();
        Self {
            layout: LayoutVariant::default(),
            custom_layout: None,
            channel_capacity: driver.channel_capacity,
            max_transport_errors: driver.max_transport_errors,
            replay: ReplayConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: LinkConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| LinkError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// The layout decoders should use.
    pub fn payload_layout(&self) -> PayloadLayout {
        self.custom_layout.clone().unwrap_or_else(|| self.layout.layout())
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            channel_capacity: self.channel_capacity,
            max_transport_errors: self.max_transport_errors,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(LinkError::config_error("channel_capacity must be at least 1"));
        }
        if self.replay.mtu == 0 {
            return Err(LinkError::config_error("replay.mtu must be at least 1"));
        }
        self.payload_layout().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::IntWidth;

    #[test]
    fn empty_document_is_default() {
        let config = LinkConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, LinkConfig::default());
        assert_eq!(config.payload_layout(), PayloadLayout::mini());
        assert_eq!(config.replay.mtu, 512);
    }

    #[test]
    fn layout_variant_is_selected_by_name() {
        let config = LinkConfig::from_yaml_str("layout: legacy\nreplay:\n  interval_ms: 40\n").unwrap();
        assert_eq!(config.payload_layout(), PayloadLayout::legacy());
        assert_eq!(config.replay.interval(), Duration::from_millis(40));
        assert_eq!(config.replay.mtu, 512);
    }

    #[test]
    fn custom_layout_overrides_variant() {
        let yaml = r#"
layout: legacy
custom_layout:
  utc_time: 0
  latitude: 4
  longitude: 8
  altitude_wgs: 12
  altitude_msl: 16
  speed: 20
  heading: 24
  battery: 28
  accel:
    width: i16
    offsets: [30, 32, 34]
    divisor: 100.0
"#;
        let config = LinkConfig::from_yaml_str(yaml).unwrap();
        let layout = config.payload_layout();
        assert_eq!(layout.latitude, 4);
        assert_eq!(layout.fix_status, None);
        assert_eq!(layout.battery, Some(28));
        assert_eq!(layout.accel.width, IntWidth::I16);
        assert_eq!(layout.gyro, None);
    }

    #[test]
    fn out_of_bounds_custom_layout_is_rejected() {
        let mut config = LinkConfig::default();
        config.custom_layout = Some(PayloadLayout { speed: 78, ..PayloadLayout::mini() });
        let yaml = config.to_yaml_string().unwrap();
        assert!(matches!(LinkConfig::from_yaml_str(&yaml), Err(LinkError::Layout { .. })));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = LinkConfig::from_yaml_str("channel_capacity: 0").unwrap_err();
        assert!(matches!(err, LinkError::Config { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = LinkConfig::from_yaml_str("layout: [").unwrap_err();
        assert!(matches!(err, LinkError::Config { .. }));
        let err = LinkConfig::from_yaml_str("layout: bogus").unwrap_err();
        assert!(matches!(err, LinkError::Config { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link.yaml");
        std::fs::write(&path, "max_transport_errors: 2\n").unwrap();

        let config = LinkConfig::load(&path).unwrap();
        assert_eq!(config.driver_options().max_transport_errors, 2);

        assert!(matches!(LinkConfig::load(dir.path().join("missing.yaml")), Err(LinkError::File { .. })));
    }
}
