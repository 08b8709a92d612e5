//! # concurrent_queue_rs
//!
//! A thread-safe unbounded FIFO queue for multiple producers and multiple
//! consumers, built from a mutex-protected `VecDeque` and a condition variable.
//!
//! Consumers can poll with [`ConcurrentQueue::try_pop`], block with
//! [`ConcurrentQueue::wait_and_pop`], or block with a deadline using
//! [`ConcurrentQueue::wait_and_pop_timeout`]. Whole-queue operations (clone,
//! take, assign, swap, equality) are safe to run while other threads push and
//! pop.
//!
//! ```rust
//! use concurrent_queue_rs::ConcurrentQueue;
//! use std::thread;
//!
//! let queue = ConcurrentQueue::new();
//! thread::scope(|s| {
//!     s.spawn(|| queue.push(42));
//!     assert_eq!(queue.wait_and_pop(), 42);
//! });
//! assert!(queue.is_empty());
//! ```

mod common;
mod trace;

pub mod concurrent_queue;
pub mod thread_storage;

// Re-exports for convenience
pub use common::{DrainOps, QueueOps};
pub use concurrent_queue::ConcurrentQueue;
pub use thread_storage::ThreadStorage;
pub use trace::init_tracing;
