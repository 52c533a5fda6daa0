//! Message id allocation.
//!
//! Every recognized message gets an id from a single allocator shared by all
//! flow consumers, so request and response records can be cross-referenced in
//! the output.

use std::sync::atomic::{AtomicU64, Ordering};

/// Correlation id of one parsed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    /// Get the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-wide monotonically increasing id counter.
///
/// Starts at 0; the first id handed out is 1. Relaxed ordering is enough since
/// only uniqueness is required, not synchronization with other memory.
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    last: AtomicU64,
}

impl SequenceAllocator {
    /// Create an allocator whose first id is 1.
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Issue the next id.
    pub fn next(&self) -> MessageId {
        MessageId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Last id issued, 0 if none yet.
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}
