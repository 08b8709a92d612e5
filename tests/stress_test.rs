//! Multi-producer multi-consumer stress tests driven through the generic
//! `QueueOps` contract, plus a randomized comparison against a plain `VecDeque`.

use concurrent_queue_rs::{ConcurrentQueue, DrainOps, QueueOps};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Test that all pushed elements are popped exactly once with multiple
/// producers and multiple blocking consumers
fn stress<Q>(queue_generator: impl Fn() -> Q)
where
    Q: QueueOps<u32> + Send + Sync + 'static,
{
    const PRODUCERS: usize = 3;
    const CONSUMERS: usize = 3;
    const N: u32 = 100_000;

    let q = Arc::new(queue_generator());
    let barrier = Arc::new(Barrier::new(PRODUCERS + CONSUMERS));

    let mut producer_handles = Vec::with_capacity(PRODUCERS);
    for _ in 0..PRODUCERS {
        let q = Arc::clone(&q);
        let barrier = Arc::clone(&barrier);
        producer_handles.push(thread::spawn(move || {
            barrier.wait();
            for n in (1..=N).rev() {
                q.push(n);
            }
        }));
    }

    // Each producer ends its run with a 1, so each consumer stops after seeing one
    let mut consumer_handles = Vec::with_capacity(CONSUMERS);
    for _ in 0..CONSUMERS {
        let q = Arc::clone(&q);
        let barrier = Arc::clone(&barrier);
        consumer_handles.push(thread::spawn(move || {
            barrier.wait();
            let mut result = 0u64;
            loop {
                let n = q.wait_and_pop();
                result += n as u64;
                if n == 1 {
                    break;
                }
            }
            result
        }));
    }

    for handle in producer_handles {
        handle.join().unwrap();
    }
    let consumed: u64 = consumer_handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum();

    // Whatever the consumers left behind still belongs to the total
    let leftover: u64 = q.drain_available().into_iter().map(u64::from).sum();

    let expected = (N as u64 * (N as u64 + 1) / 2) * PRODUCERS as u64;
    assert_eq!(consumed + leftover, expected, "every element must be popped exactly once");
    assert!(q.is_empty());
}

#[test]
fn test_stress_concurrent_queue() {
    stress(ConcurrentQueue::<u32>::new);
}

#[test]
fn test_stress_preallocated_queue() {
    stress(|| ConcurrentQueue::<u32>::with_capacity(1024));
}

#[test]
fn test_per_producer_order_is_preserved() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 10_000;

    let q = Arc::new(ConcurrentQueue::new());

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    q.push((producer, seq));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut next = vec![0; PRODUCERS as usize];
    while let Some((producer, seq)) = q.try_pop() {
        assert_eq!(seq, next[producer as usize], "producer {producer} reordered");
        next[producer as usize] += 1;
    }
    assert!(next.iter().all(|&count| count == PER_PRODUCER));
}

#[test]
fn test_swap_racing_waiters() {
    const WAITERS: usize = 4;

    let q = Arc::new(ConcurrentQueue::<usize>::new());
    let barrier = Arc::new(Barrier::new(WAITERS + 1));

    let waiters: Vec<_> = (0..WAITERS)
        .map(|_| {
            let q = Arc::clone(&q);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                q.wait_and_pop()
            })
        })
        .collect();

    barrier.wait();
    thread::sleep(Duration::from_millis(50));
    let other: ConcurrentQueue<usize> = (0..WAITERS).collect();
    q.swap(&other);

    let mut received: Vec<usize> = waiters.into_iter().map(|h| h.join().unwrap()).collect();
    received.sort_unstable();
    assert_eq!(received, (0..WAITERS).collect::<Vec<_>>());
    assert!(q.is_empty());
    assert!(other.is_empty());
}

#[test]
fn test_random_operations_match_vecdeque() {
    let mut rng = rand::rng();
    let q = ConcurrentQueue::new();
    let mut model = VecDeque::new();

    for _ in 0..10_000 {
        match rng.random_range(0..4) {
            0 | 1 => {
                let value: i64 = rng.random();
                q.push(value);
                model.push_back(value);
            }
            2 => assert_eq!(q.try_pop(), model.pop_front()),
            _ => {
                let mut out = 0;
                let popped = q.try_pop_into(&mut out);
                match model.pop_front() {
                    Some(expected) => {
                        assert!(popped);
                        assert_eq!(out, expected);
                    }
                    None => {
                        assert!(!popped);
                        assert_eq!(out, 0);
                    }
                }
            }
        }
        assert_eq!(q.len(), model.len());
    }

    assert_eq!(q.into_inner(), model);
}
