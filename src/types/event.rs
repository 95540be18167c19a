//! Session output events, resync diagnostics and counters

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::LiveDataRecord;

/// Why the scanner discarded bytes.
///
/// None of these stop processing; each one describes a resync step the
/// scanner already took.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeDiagnostic {
    /// Bytes ahead of a sync marker were dropped.
    #[error("skipped {discarded} bytes before sync marker")]
    GarbageSkipped { discarded: usize },

    /// No sync marker anywhere in the buffer; everything was dropped.
    #[error("no sync marker found, discarded {discarded} bytes")]
    NoSyncFound { discarded: usize },

    /// Sync marker followed by an unexpected class/id; sync bytes skipped.
    #[error("unexpected message class {class:#04x} id {id:#04x}")]
    HeaderMismatch { class: u8, id: u8 },

    /// Live-data header with the wrong payload length; sync bytes skipped.
    #[error("payload length {actual} does not match expected {expected}")]
    PayloadLengthMismatch { expected: usize, actual: usize },
}

impl DecodeDiagnostic {
    /// Bytes removed from the accumulator by this resync step.
    pub fn discarded(&self) -> usize {
        match self {
            DecodeDiagnostic::GarbageSkipped { discarded }
            | DecodeDiagnostic::NoSyncFound { discarded } => *discarded,
            DecodeDiagnostic::HeaderMismatch { .. }
            | DecodeDiagnostic::PayloadLengthMismatch { .. } => crate::protocol::SYNC_LEN,
        }
    }
}

/// One output of [`Session::on_fragment`](crate::session::Session::on_fragment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Record(LiveDataRecord),
    Diagnostic(DecodeDiagnostic),
}

impl SessionEvent {
    pub fn record(&self) -> Option<&LiveDataRecord> {
        match self {
            SessionEvent::Record(record) => Some(record),
            SessionEvent::Diagnostic(_) => None,
        }
    }

    pub fn into_record(self) -> Option<LiveDataRecord> {
        match self {
            SessionEvent::Record(record) => Some(record),
            SessionEvent::Diagnostic(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&DecodeDiagnostic> {
        match self {
            SessionEvent::Record(_) => None,
            SessionEvent::Diagnostic(diag) => Some(diag),
        }
    }
}

/// Running counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Fragments handed to the session
    pub fragments: u64,
    /// Bytes appended to the accumulator
    pub bytes_received: u64,
    /// Bytes dropped during resync
    pub bytes_discarded: u64,
    /// Records decoded
    pub records: u64,
    /// Diagnostics emitted
    pub diagnostics: u64,
    /// Accumulator resets (teardown or invariant failure)
    pub resets: u64,
}

/// Connection state published by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkStatus {
    /// Attached, no fragment seen yet
    #[default]
    Connecting,
    /// Fragments are arriving
    Streaming,
    /// The transport ended or failed; the session has been reset
    Disconnected { reason: String },
}

impl LinkStatus {
    pub fn is_disconnected(&self) -> bool {
        matches!(self, LinkStatus::Disconnected { .. })
    }
}
