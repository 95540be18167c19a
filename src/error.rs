//! Error types for link processing.
//!
//! The scanner itself never fails: malformed input degrades to a
//! [`DecodeDiagnostic`](crate::types::DecodeDiagnostic) or a silent wait for more
//! bytes. The errors in this module cover everything around it: bounds-checked
//! buffer access, transports, capture files and configuration.
//!
//! ## Error Categories
//!
//! - **Buffer Errors**: bounds-checked accumulator reads past the buffered data
//! - **Transport Errors**: the wireless stack failed to deliver fragments
//! - **File Errors**: capture files that cannot be read or written
//! - **Config Errors**: invalid YAML or payload layout tables
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use racelink::LinkError;
//!
//! let error = LinkError::transport_failed("notification stream dropped");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for link operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Main error type for link operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Read of {len} bytes at offset {offset} exceeds buffered length {available}")]
    OutOfRange { offset: usize, len: usize, available: usize },

    #[error("Transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Invalid payload layout for field '{field}': {details}")]
    Layout { field: String, details: String },

    #[error("Fragment channel closed")]
    ChannelClosed,

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl LinkError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinkError::Transport { .. } => true,
            LinkError::Timeout { .. } => true,
            LinkError::OutOfRange { .. } => false,
            LinkError::File { .. } => false,
            LinkError::Config { .. } => false,
            LinkError::Parse { .. } => false,
            LinkError::Layout { .. } => false,
            LinkError::ChannelClosed => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LinkError::OutOfRange { .. } => vec![
                "Check buffered length before reading",
                "Reset the session accumulator",
            ],
            LinkError::Transport { .. } => vec![
                "Check the device is powered and in range",
                "Re-subscribe to the notify characteristic",
                "Reconnect and attach a new session",
            ],
            LinkError::File { .. } => vec![
                "Check the capture file exists and is readable",
                "Check file permissions",
            ],
            LinkError::Config { .. } => vec![
                "Check the YAML syntax",
                "Compare against the default configuration",
            ],
            LinkError::Parse { .. } => vec![
                "Verify source data integrity",
                "Check the capture was recorded from the notify characteristic",
            ],
            LinkError::Layout { .. } => vec![
                "Keep every field inside the 80-byte payload",
                "Start from the mini or legacy layout",
            ],
            LinkError::ChannelClosed => vec![
                "Keep the fragment sender alive for the session lifetime",
                "Attach a new connection",
            ],
            LinkError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Check the device is streaming",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        LinkError::File { path, source }
    }

    /// Helper constructor for transport errors.
    pub fn transport_failed(reason: impl Into<String>) -> Self {
        LinkError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with source.
    pub fn transport_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for out-of-range buffer reads.
    pub fn out_of_range(offset: usize, len: usize, available: usize) -> Self {
        LinkError::OutOfRange { offset, len, available }
    }

    /// Helper constructor for layout validation errors.
    pub fn layout_error(field: impl Into<String>, details: impl Into<String>) -> Self {
        LinkError::Layout { field: field.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(details: impl Into<String>) -> Self {
        LinkError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for LinkError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        LinkError::Config { details: err.to_string() }
    }
}
