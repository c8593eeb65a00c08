//! Bounded ring buffer for metric streams.
//!
//! Fixed-capacity sequence container with O(1) insertion that silently
//! discards the oldest element once full. The container itself is not
//! synchronized; the owning engine serializes access behind its own locks.

use std::collections::VecDeque;

/// Fixed-capacity FIFO that overwrites its oldest entry when full.
///
/// Inserting into a full buffer is a valid operation, not an error: the
/// oldest element is dropped to make room. Reads go through [`snapshot`],
/// which clones the current contents so aggregation can proceed without
/// holding the owner's lock.
///
/// [`snapshot`]: RingBuffer::snapshot
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates a buffer holding at most `capacity` elements.
    ///
    /// A zero-capacity buffer accepts and discards every push.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { items: VecDeque::with_capacity(capacity), capacity }
    }

    /// Appends an element, dropping the oldest one if the buffer is full.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Number of elements currently held, `<= capacity`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed element, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Drops all elements; capacity is unchanged.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Returns all held elements in insertion order (oldest first).
    ///
    /// The result is a fresh copy, not a live view: ingestion that continues
    /// after the snapshot does not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
