//! Raw transport fragments

use std::sync::Arc;

/// One chunk of bytes as delivered by a single transport notification.
///
/// The payload is shared via `Arc` so a fragment can be logged or captured
/// without copying; the session copies it into its accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Notification bytes
    pub data: Arc<[u8]>,

    /// Arrival order within the connection, starting at 0
    pub sequence: u64,
}

impl Fragment {
    pub fn new(data: Vec<u8>, sequence: u64) -> Self {
        Self { data: data.into(), sequence }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
