use concurrent_queue_rs::{init_tracing, ConcurrentQueue, ThreadStorage};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() {
    init_tracing();

    println!("ConcurrentQueue Rust Example");
    println!("----------------------------\n");

    // Configuration
    const PRODUCERS: usize = 1; // Number of producer threads
    const CONSUMERS: usize = 2; // Number of consumer threads
    const N: u32 = 1_000_000; // Each producer pushes this many elements into the queue

    // Create a queue object shared between all producers and consumers
    let queue = Arc::new(ConcurrentQueue::<u32>::new());

    println!("Starting {} producers and {} consumers", PRODUCERS, CONSUMERS);
    println!("Each producer will push {} elements\n", N);

    let start_time = Instant::now();
    let sums = Arc::new(Mutex::new(vec![0u64; CONSUMERS]));

    {
        let mut consumers = ThreadStorage::new(CONSUMERS);
        for i in 0..CONSUMERS {
            let q = queue.clone();
            let sums = sums.clone();
            consumers.spawn(i, move || {
                let mut local_sum = 0u64;

                // Block until an element arrives; 0 is the termination signal
                loop {
                    let n = q.wait_and_pop();
                    if n == 0 {
                        break;
                    }
                    local_sum += n as u64;
                }

                sums.lock()[i] = local_sum;
            });
        }

        {
            let mut producers = ThreadStorage::new(PRODUCERS);
            for i in 0..PRODUCERS {
                let q = queue.clone();
                producers.spawn(i, move || {
                    // Push elements in descending order [N, 1]
                    for n in (1..=N).rev() {
                        q.push(n);
                    }
                });
            }
            // Producers are joined here
        }

        // Tell consumers to terminate by pushing one 0 for each consumer
        queue.extend(std::iter::repeat(0).take(CONSUMERS));
        // Consumers are joined here
    }

    let sums = sums.lock().clone();
    let total_sum: u64 = sums.iter().sum();

    // The expected sum is N*(N+1)/2 * PRODUCERS
    let expected_sum: u64 = (N as u64 * (N as u64 + 1) / 2) * PRODUCERS as u64;

    println!("Execution time: {:?}", start_time.elapsed());
    println!("Total sum: {}", total_sum);
    println!("Expected sum: {}", expected_sum);

    if total_sum != expected_sum {
        println!("ERROR: Sum mismatch! Difference: {}", total_sum as i64 - expected_sum as i64);
    } else {
        println!("SUCCESS: All elements were correctly processed.");
    }

    println!("\nPer-consumer statistics:");
    for (i, &sum) in sums.iter().enumerate() {
        println!("Consumer {}: sum = {}", i, sum);
    }

    // A bounded wait on the drained queue gives up instead of blocking forever
    let timeout = Duration::from_millis(100);
    match queue.wait_and_pop_timeout(timeout) {
        Some(n) => println!("\nUnexpected leftover element: {}", n),
        None => println!("\nQueue stayed empty for {:?}, as expected", timeout),
    }
}
