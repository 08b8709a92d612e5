//! Scoped ownership of a fixed batch of worker threads
//!
//! [`ThreadStorage`] holds a fixed number of thread slots and joins every
//! occupied slot when it goes out of scope, including while unwinding. Test
//! harnesses use it to make sure producers and consumers of a queue have
//! finished before the queue is inspected.

use std::thread::{self, JoinHandle};

use crate::trace::{debug, warn};

/// A fixed-size set of worker thread slots joined on drop
#[derive(Debug)]
pub struct ThreadStorage {
    slots: Box<[Option<JoinHandle<()>>]>,
}

impl ThreadStorage {
    /// Creates storage with `count` empty slots
    pub fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| None).collect(),
        }
    }

    /// Returns the number of slots
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if the storage has no slots at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Starts `work` on a new thread stored in slot `index`
    ///
    /// A thread already occupying the slot is joined first.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn spawn<F>(&mut self, index: usize, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let slot_count = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .unwrap_or_else(|| panic!("thread slot {index} out of range for {slot_count} slots"));

        if let Some(previous) = slot.take() {
            if previous.join().is_err() {
                warn!(index, "replaced worker had panicked");
            }
        }

        debug!(index, "spawning worker");
        *slot = Some(thread::spawn(work));
    }

    /// Joins every occupied slot and returns how many workers panicked
    pub fn join_all(&mut self) -> usize {
        let mut panicked = 0;
        for slot in self.slots.iter_mut() {
            if let Some(handle) = slot.take() {
                if handle.join().is_err() {
                    panicked += 1;
                }
            }
        }
        if panicked > 0 {
            warn!(panicked, "workers panicked before being joined");
        }
        panicked
    }
}

impl Drop for ThreadStorage {
    fn drop(&mut self) {
        // Worker panics are not re-raised here so the owner always finishes joining
        self.join_all();
    }
}
