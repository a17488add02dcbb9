//! Fixed-capacity message pool.
//!
//! Message buffers live in a fixed number of slots. The free list is a
//! lock-free [`ArrayQueue`] of slot indices, filled once at construction.
//! A [`Message`] owns one slot and returns it on drop, so every allocated
//! slot is released exactly once whichever path the message takes: consumed,
//! rejected by a full channel, or discarded on shutdown.
//!
//! # RT Safety
//!
//! [`MessagePool::allocate`] and the release in `Drop` are one lock-free
//! queue operation plus a relaxed counter increment. No heap allocation
//! happens after [`MessagePool::new`].

use crossbeam::queue::ArrayQueue;
use portable_atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::sync::Arc;

use crate::error::ConfigError;

/// Maximum length of a message tag in bytes.
pub const MESSAGE_SIZE: usize = 16;

/// Inline message payload.
pub type MessageTag = heapless::String<MESSAGE_SIZE>;

/// Pool accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of slots.
    pub capacity: usize,
    /// Successful allocations.
    pub allocated: u64,
    /// Releases.
    pub released: u64,
    /// Slots currently held by a message.
    pub in_use: u64,
}

#[derive(Debug)]
struct PoolInner {
    free: ArrayQueue<usize>,
    capacity: usize,
    allocated: AtomicU64,
    released: AtomicU64,
}

impl PoolInner {
    fn release(&self, slot: usize) {
        if self.free.push(slot).is_err() {
            // Slots are conserved, so the free list always has room.
            tracing::error!(slot, "Message slot released into a full free list");
            return;
        }
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shared handle to a fixed set of message slots.
#[derive(Debug, Clone)]
pub struct MessagePool {
    inner: Arc<PoolInner>,
}

impl MessagePool {
    /// Create a pool with `slots` free slots.
    ///
    /// # Errors
    ///
    /// Returns an error if `slots` is zero.
    pub fn new(slots: usize) -> Result<Self, ConfigError> {
        if slots == 0 {
            return Err(ConfigError::invalid(
                "message pool must have at least one slot",
            ));
        }
        let free = ArrayQueue::new(slots);
        for slot in 0..slots {
            if free.push(slot).is_err() {
                return Err(ConfigError::invalid("message pool free list overflow"));
            }
        }
        Ok(Self {
            inner: Arc::new(PoolInner {
                free,
                capacity: slots,
                allocated: AtomicU64::new(0),
                released: AtomicU64::new(0),
            }),
        })
    }

    /// Take a free slot, or `None` if every slot is held.
    #[must_use]
    pub fn allocate(&self) -> Option<Message> {
        let slot = self.inner.free.pop()?;
        self.inner.allocated.fetch_add(1, Ordering::Relaxed);
        Some(Message {
            slot,
            tag: MessageTag::new(),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of free slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.free.len()
    }

    /// Total successful allocations.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.inner.allocated.load(Ordering::Relaxed)
    }

    /// Total releases.
    #[must_use]
    pub fn released(&self) -> u64 {
        self.inner.released.load(Ordering::Relaxed)
    }

    /// Slots currently held by a message.
    #[must_use]
    pub fn in_use(&self) -> u64 {
        self.allocated().saturating_sub(self.released())
    }

    /// Accounting snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let allocated = self.allocated();
        let released = self.released();
        PoolStats {
            capacity: self.capacity(),
            allocated,
            released,
            in_use: allocated.saturating_sub(released),
        }
    }
}

/// One pooled message buffer.
///
/// Ownership moves from the producer into the data channel and from there
/// to the consumer. Dropping the message releases its slot.
pub struct Message {
    slot: usize,
    tag: MessageTag,
    pool: Arc<PoolInner>,
}

impl Message {
    /// Slot index in the owning pool.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Payload text.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.tag.as_str()
    }

    /// Replace the payload with `Data <uptime_ms>`.
    pub fn stamp(&mut self, uptime_ms: u32) {
        self.tag.clear();
        // "Data " plus at most ten digits always fits.
        if write!(self.tag, "Data {uptime_ms}").is_err() {
            tracing::debug!(slot = self.slot, "Message tag truncated");
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("slot", &self.slot)
            .field("tag", &self.tag.as_str())
            .finish_non_exhaustive()
    }
}

impl Drop for Message {
    fn drop(&mut self) {
        self.pool.release(self.slot);
    }
}
