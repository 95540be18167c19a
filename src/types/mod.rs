//! Core types for decoded telemetry and session output.
//!
//! - [`Fragment`] is one transport notification's bytes
//! - [`LiveDataRecord`] is one decoded live-data frame in physical units
//! - [`FixStatus`] and [`BatteryStatus`] decode the status bytes
//! - [`SessionEvent`] is what a session emits per fragment: a record or a
//!   [`DecodeDiagnostic`] describing a resync step
//! - [`SessionStats`] and [`LinkStatus`] describe a running connection
//!
//! ```rust
//! use racelink::types::{BatteryStatus, FixStatus};
//!
//! let battery = BatteryStatus::new(0x96);
//! assert!(battery.is_charging());
//! assert_eq!(battery.percent(), 22);
//! assert_eq!(FixStatus::from_raw(3).description(), "3D Fix");
//! ```

mod battery;
mod event;
mod fix_status;
mod fragment;
mod record;
mod update_rate;

pub use battery::BatteryStatus;
pub use event::{DecodeDiagnostic, LinkStatus, SessionEvent, SessionStats};
pub use fix_status::FixStatus;
pub use fragment::Fragment;
pub use record::{Axes, LiveDataRecord};
pub use update_rate::UpdateRate;
