//! Common functionality for concurrent queues
//!
//! This module provides the trait describing the queue contract, so harnesses
//! and benchmarks can be written once against any implementation.

use std::sync::Arc;

/// Trait for concurrent queue operations
///
/// Every method takes `&self`: implementations synchronize internally and are
/// safe to call from many threads at once without caller-side locking.
pub trait QueueOps<T> {
    /// Pushes an element to the back of the queue, waking one blocked consumer
    fn push(&self, element: T);

    /// Attempts to pop the front element
    ///
    /// Returns `None` immediately if the queue was empty. Never blocks.
    fn try_pop(&self) -> Option<T>;

    /// Pops the front element, blocking until one is available
    fn wait_and_pop(&self) -> T;

    /// Returns the number of queued elements at the moment of the call
    ///
    /// Advisory only when other threads are pushing or popping concurrently.
    fn len(&self) -> usize;

    /// Checks if the queue was empty at the moment of the call
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, Q: QueueOps<T> + ?Sized> QueueOps<T> for Arc<Q> {
    #[inline]
    fn push(&self, element: T) {
        (**self).push(element);
    }

    #[inline]
    fn try_pop(&self) -> Option<T> {
        (**self).try_pop()
    }

    #[inline]
    fn wait_and_pop(&self) -> T {
        (**self).wait_and_pop()
    }

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

/// Helper trait for draining a queue without blocking
pub trait DrainOps<T>: QueueOps<T> {
    /// Pops elements until the queue is observed empty, in FIFO order
    fn drain_available(&self) -> Vec<T> {
        let mut drained = Vec::new();
        while let Some(element) = self.try_pop() {
            drained.push(element);
        }
        drained
    }
}

impl<T, Q: QueueOps<T> + ?Sized> DrainOps<T> for Q {}
