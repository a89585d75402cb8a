//! Stress tests for the key/list store.
//!
//! These drive a [`Store`] under heavy load and concurrent access, and
//! check that concurrent appends to one key come out linearizable.

use kls_core::{Store, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Size of each value in bytes. Must be below the store's entry size.
    pub value_size: usize,
    /// Number of distinct keys.
    pub key_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            value_size: 64,
            key_count: 1_000,
        }
    }
}

impl StressConfig {
    fn ops_per_thread(&self) -> usize {
        self.operations / self.threads.max(1)
    }
}

/// Key used for the `idx`-th key of a stress run.
pub fn stress_key(idx: usize) -> Vec<u8> {
    format!("key-{idx}").into_bytes()
}

/// Run a sequential insert stress test.
pub fn stress_sequential_inserts(store: &Store, config: &StressConfig) -> StressTestResult {
    let value = vec![0xABu8; config.value_size];

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = stress_key(i % config.key_count.max(1));
        match store.insert(&key, &value) {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a sequential search stress test against preloaded keys.
pub fn stress_sequential_searches(store: &Store, config: &StressConfig) -> StressTestResult {
    let key_count = config.key_count.max(1);
    let value = vec![0xCDu8; config.value_size];
    for idx in 0..key_count {
        let _ = store.insert(&stress_key(idx), &value);
    }

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        match store.search(&stress_key(i % key_count), 0) {
            Ok(_) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a mixed insert/search/delete stress test.
///
/// Misses (`KeyNotFound`, `IndexOutOfRange`) are expected here and count
/// as successful operations.
pub fn stress_mixed_operations(store: &Store, config: &StressConfig) -> StressTestResult {
    let key_count = config.key_count.max(1);
    let value = vec![0xABu8; config.value_size];

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = stress_key(i % key_count);

        let result = match i % 3 {
            0 => store.insert(&key, &value),
            1 => store.search(&key, i % 4).map(|_| ()),
            _ => store.delete(&key),
        };

        match result {
            Ok(()) | Err(StoreError::KeyNotFound | StoreError::IndexOutOfRange { .. }) => {
                successful += 1;
            }
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Encodes the `seq`-th append of thread `thread` as a value.
fn append_tag(thread: usize, seq: usize) -> [u8; 8] {
    let mut tag = [0u8; 8];
    tag[..4].copy_from_slice(&(thread as u32).to_be_bytes());
    tag[4..].copy_from_slice(&(seq as u32).to_be_bytes());
    tag
}

fn decode_tag(value: &[u8]) -> Option<(usize, usize)> {
    let thread = u32::from_be_bytes(value.get(..4)?.try_into().ok()?);
    let seq = u32::from_be_bytes(value.get(4..8)?.try_into().ok()?);
    Some((thread as usize, seq as usize))
}

/// Run concurrent appends from every thread to the single key `key`.
///
/// Each value records its thread and sequence number; check the outcome
/// with [`verify_appends`].
pub fn stress_concurrent_appends(
    store: Arc<Store>,
    key: &[u8],
    config: &StressConfig,
) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.ops_per_thread();

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let key = key.to_vec();

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    match store.insert(&key, &append_tag(t, i)) {
                        Ok(()) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Checks the value list left by [`stress_concurrent_appends`].
///
/// Every append must be present exactly once, and each thread's appends
/// must appear in the order that thread issued them. Returns the number
/// of values found.
pub fn verify_appends(
    store: &Store,
    key: &[u8],
    threads: usize,
    per_thread: usize,
) -> Result<usize, String> {
    let mut next_seq = vec![0usize; threads];
    let mut index = 0usize;

    loop {
        let value = match store.search(key, index) {
            Ok(value) => value,
            Err(StoreError::IndexOutOfRange { .. }) => break,
            Err(e) => return Err(format!("search {index} failed: {e}")),
        };
        let (thread, seq) =
            decode_tag(&value).ok_or_else(|| format!("value {index} is not a tag"))?;
        let expected = next_seq
            .get_mut(thread)
            .ok_or_else(|| format!("value {index} names unknown thread {thread}"))?;
        if seq != *expected {
            return Err(format!(
                "value {index}: thread {thread} seq {seq}, expected {expected}"
            ));
        }
        *expected += 1;
        index += 1;
    }

    if let Some(t) = next_seq.iter().position(|n| *n != per_thread) {
        return Err(format!(
            "thread {t} has {} values, expected {per_thread}",
            next_seq[t]
        ));
    }
    Ok(index)
}

/// Run a concurrent search stress test against preloaded keys.
pub fn stress_concurrent_searches(store: Arc<Store>, config: &StressConfig) -> StressTestResult {
    let key_count = config.key_count.max(1);
    let value = vec![0xCDu8; config.value_size];
    for idx in 0..key_count {
        let _ = store.insert(&stress_key(idx), &value);
    }

    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.ops_per_thread();

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let idx = (t * ops_per_thread + i) % key_count;
                    match store.search(&stress_key(idx), 0) {
                        Ok(_) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Run concurrent create/read/delete cycles on per-thread keys.
///
/// Each thread owns its keys, so every operation is expected to succeed
/// and the store ends up empty.
pub fn stress_concurrent_churn(store: Arc<Store>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let cycles = config.ops_per_thread() / 4;
    let value_size = config.value_size;

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                let first = vec![0x01u8; value_size];
                let second = vec![0x02u8; value_size];
                for i in 0..cycles {
                    let key = format!("churn-{t}-{i}").into_bytes();
                    let inserted_first = store.insert(&key, &first).is_ok();
                    let inserted_second = store.insert(&key, &second).is_ok();
                    let read_back = store
                        .search(&key, 1)
                        .is_ok_and(|v| v == second.as_slice());
                    let deleted = store.delete(&key).is_ok();

                    for ok in [inserted_first, inserted_second, read_back, deleted] {
                        if ok {
                            successful.fetch_add(1, Ordering::Relaxed);
                        } else {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}
