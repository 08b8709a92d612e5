//! Implementation of a blocking concurrent queue
//!
//! This module provides an unbounded multiple-producer-multiple-consumer FIFO
//! queue built from one mutex-protected `VecDeque` and one condition variable.
//! Consumers may poll with [`ConcurrentQueue::try_pop`] or park in
//! [`ConcurrentQueue::wait_and_pop`] until a producer hands them an element.

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::ptr;
use std::time::{Duration, Instant};

use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::common::QueueOps;
use crate::trace::{debug, trace};

/// A thread-safe unbounded FIFO queue with blocking and non-blocking pops
///
/// Every access to the element sequence happens under a single mutex, so each
/// operation observes and leaves behind a fully consistent sequence. Blocking
/// consumers wait on a condition variable tied to that mutex and re-check for
/// an element after every wakeup, which rules out lost and spurious wakeups.
///
/// `push` wakes at most one parked consumer. Operations that can make several
/// elements available at once (`extend`, `assign`, `assign_from`, `swap`)
/// wake every parked consumer and let them race for the new elements.
///
/// A queue cannot be dropped while a thread is blocked in `wait_and_pop` on
/// it: the blocked thread holds a borrow (or an `Arc` clone) that keeps the
/// queue alive.
pub struct ConcurrentQueue<T> {
    /// The element sequence; front is the next element to be popped
    ///
    /// Padded to its own cache line so queues stored side by side do not
    /// contend on each other's lock word.
    elements: CachePadded<Mutex<VecDeque<T>>>,

    /// Signalled whenever the sequence may have become non-empty
    available: Condvar,
}

impl<T> ConcurrentQueue<T> {
    /// Creates a new empty queue
    pub fn new() -> Self {
        Self::from(VecDeque::new())
    }

    /// Creates a new empty queue with room for `capacity` elements
    ///
    /// The capacity is only an allocation hint; the queue still grows without
    /// bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(VecDeque::with_capacity(capacity))
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.elements.lock()
    }

    /// Appends an element to the back of the queue and wakes one waiter
    pub fn push(&self, element: T) {
        self.lock().push_back(element);
        self.available.notify_one();
    }

    /// Constructs an element from `args` and pushes it
    pub fn emplace<A>(&self, args: A)
    where
        T: From<A>,
    {
        self.push(T::from(args));
    }

    /// Runs `make` and pushes the element it returns
    ///
    /// The constructor runs before the lock is taken.
    pub fn emplace_with<F>(&self, make: F)
    where
        F: FnOnce() -> T,
    {
        self.push(make());
    }

    /// Appends every element of `iter` under a single lock acquisition
    ///
    /// The iterator is drained before the lock is taken, so it may be slow or
    /// even use this queue. Wakes all waiters if anything was appended.
    pub fn extend<I>(&self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut incoming: VecDeque<T> = iter.into_iter().collect();
        if incoming.is_empty() {
            return;
        }

        self.lock().append(&mut incoming);
        self.available.notify_all();
    }

    /// Attempts to pop the front element without blocking
    ///
    /// Returns `None` if the queue was empty.
    #[inline]
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Attempts to pop the front element into `out`
    ///
    /// Returns `false` and leaves `out` untouched if the queue was empty.
    pub fn try_pop_into(&self, out: &mut T) -> bool {
        match self.try_pop() {
            Some(element) => {
                *out = element;
                true
            }
            None => false,
        }
    }

    /// Pops the front element, blocking while the queue is empty
    ///
    /// The lock is released while parked. There is no timeout; use
    /// [`wait_and_pop_timeout`](Self::wait_and_pop_timeout) or
    /// [`try_pop`](Self::try_pop) when blocking forever is not acceptable.
    pub fn wait_and_pop(&self) -> T {
        let mut elements = self.lock();
        loop {
            if let Some(element) = elements.pop_front() {
                return element;
            }
            trace!("queue empty, parking consumer");
            self.available.wait(&mut elements);
            trace!("consumer woken");
        }
    }

    /// Blocking pop that writes the front element into `out`
    pub fn wait_and_pop_into(&self, out: &mut T) {
        *out = self.wait_and_pop();
    }

    /// Pops the front element, blocking for at most `timeout`
    ///
    /// Returns `None` if the queue stayed empty until the deadline.
    pub fn wait_and_pop_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait_and_pop());
        };

        let mut elements = self.lock();
        loop {
            if let Some(element) = elements.pop_front() {
                return Some(element);
            }
            if self.available.wait_until(&mut elements, deadline).timed_out() {
                // Final recheck under the reacquired lock
                let element = elements.pop_front();
                if element.is_none() {
                    trace!(?timeout, "timed out waiting for an element");
                }
                return element;
            }
        }
    }

    /// Returns the number of queued elements
    ///
    /// Under concurrent pushes and pops the value describes a consistent state
    /// at the moment the lock was held, not necessarily the current one.
    #[inline]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Checks if the queue was empty at the moment of the call
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every queued element
    pub fn clear(&self) {
        // Dropped after the guard is released
        let dropped = mem::take(&mut *self.lock());
        drop(dropped);
    }

    /// Moves the contents out into a new queue, leaving this one empty
    ///
    /// The donor stays fully usable and keeps its own lock and waiters.
    pub fn take(&self) -> Self {
        Self::from(mem::take(&mut *self.lock()))
    }

    /// Consumes the queue and returns its elements in FIFO order
    pub fn into_inner(self) -> VecDeque<T> {
        self.elements.into_inner().into_inner()
    }

    /// Replaces the contents, wakes waiters if the new contents are non-empty
    /// and returns the old contents so they are dropped outside the lock
    fn replace(&self, incoming: VecDeque<T>) -> VecDeque<T> {
        let ready = !incoming.is_empty();
        let previous = mem::replace(&mut *self.lock(), incoming);
        if ready {
            self.available.notify_all();
        }
        previous
    }

    /// Move-assigns `source` into this queue
    ///
    /// The previous contents are dropped. Consumers parked on this queue are
    /// woken if `source` had elements.
    pub fn assign(&self, source: Self) {
        let incoming = source.into_inner();
        debug!(len = incoming.len(), "move-assigning queue contents");
        drop(self.replace(incoming));
    }

    /// Copy-assigns a snapshot of `source` into this queue
    ///
    /// `source` is only locked while it is cloned; the two locks are never held
    /// together. Assigning a queue to itself does nothing.
    pub fn assign_from(&self, source: &Self)
    where
        T: Clone,
    {
        if ptr::eq(self, source) {
            return;
        }
        let incoming = source.lock().clone();
        debug!(len = incoming.len(), "copy-assigning queue contents");
        drop(self.replace(incoming));
    }

    /// Exchanges the contents of two queues
    ///
    /// Both locks are taken in address order, so two threads swapping the same
    /// pair in opposite directions cannot deadlock. Observers see either the
    /// old or the new contents of each queue, never a mix.
    pub fn swap(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }

        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };

        let (first_ready, second_ready) = {
            let mut first_elements = first.lock();
            let mut second_elements = second.lock();
            mem::swap(&mut *first_elements, &mut *second_elements);
            debug!(
                first = first_elements.len(),
                second = second_elements.len(),
                "swapped queue contents"
            );
            (!first_elements.is_empty(), !second_elements.is_empty())
        };

        if first_ready {
            first.available.notify_all();
        }
        if second_ready {
            second.available.notify_all();
        }
    }

    /// Compares the contents of two queues element by element
    ///
    /// Both queues are locked in address order for the duration of the
    /// comparison. The answer is a point-in-time comparison: other threads may
    /// change either queue right after it is computed.
    pub fn equals(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        if ptr::eq(self, other) {
            return true;
        }

        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };

        let first_elements = first.lock();
        let second_elements = second.lock();
        *first_elements == *second_elements
    }

    /// Returns a copy of the current contents in FIFO order
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().iter().cloned().collect()
    }
}

impl<T> QueueOps<T> for ConcurrentQueue<T> {
    #[inline]
    fn push(&self, element: T) {
        ConcurrentQueue::push(self, element);
    }

    #[inline]
    fn try_pop(&self) -> Option<T> {
        ConcurrentQueue::try_pop(self)
    }

    #[inline]
    fn wait_and_pop(&self) -> T {
        ConcurrentQueue::wait_and_pop(self)
    }

    #[inline]
    fn len(&self) -> usize {
        ConcurrentQueue::len(self)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        ConcurrentQueue::is_empty(self)
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for ConcurrentQueue<T> {
    /// Snapshots the donor under its lock; the copy gets its own lock and signal
    fn clone(&self) -> Self {
        Self::from(self.lock().clone())
    }
}

impl<T: PartialEq> PartialEq for ConcurrentQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<T: Eq> Eq for ConcurrentQueue<T> {}

impl<T: fmt::Debug> fmt::Debug for ConcurrentQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements = self.lock();
        f.debug_struct("ConcurrentQueue")
            .field("elements", &*elements)
            .finish()
    }
}

impl<T> From<VecDeque<T>> for ConcurrentQueue<T> {
    fn from(elements: VecDeque<T>) -> Self {
        Self {
            elements: CachePadded::new(Mutex::new(elements)),
            available: Condvar::new(),
        }
    }
}

impl<T> From<Vec<T>> for ConcurrentQueue<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::from(VecDeque::from(elements))
    }
}

impl<T, const N: usize> From<[T; N]> for ConcurrentQueue<T> {
    fn from(elements: [T; N]) -> Self {
        Self::from(VecDeque::from(elements))
    }
}

impl<T> FromIterator<T> for ConcurrentQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<VecDeque<T>>())
    }
}
